pub mod executor;

/// File name of the per-bucket statistics.
pub const PERCENTILES_FILE: &str = "inlinks_percentiles.json";

/// Assigns an inlinks percentile to every crawled url.
#[derive(Default)]
pub struct InlinksPercentilesTask;

impl std::fmt::Display for InlinksPercentilesTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "make inlinks percentiles")
    }
}

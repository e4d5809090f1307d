pub mod executor;

/// File name of the virtual mass summary.
pub const VIRTUALS_FILE: &str = "pagerank_virtuals.json";

/// Computes the PageRank of every crawled url.
#[derive(Default)]
pub struct PageRankTask;

impl std::fmt::Display for PageRankTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "compute pagerank")
    }
}

pub mod executor;

pub const TOP_FULL_DOMAINS_FILE: &str = "top_full_domains.json";
pub const TOP_SECOND_LEVEL_DOMAINS_FILE: &str = "top_second_level_domains.json";

/// Ranks the external domains the crawled site links to.
#[derive(Default)]
pub struct TopDomainsTask;

impl std::fmt::Display for TopDomainsTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "make top domains")
    }
}

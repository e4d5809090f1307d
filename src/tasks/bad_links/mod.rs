pub mod executor;

/// Lists every internal link pointing to a url answering with an error code.
#[derive(Default)]
pub struct BadLinksTask;

impl std::fmt::Display for BadLinksTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "make bad links")
    }
}

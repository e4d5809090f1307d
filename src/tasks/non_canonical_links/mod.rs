pub mod executor;

/// Lists every internal link pointing to a url that declares another url as its canonical.
#[derive(Default)]
pub struct NonCanonicalLinksTask;

impl std::fmt::Display for NonCanonicalLinksTask {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "make links to non-canonical urls")
    }
}

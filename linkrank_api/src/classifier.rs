use crate::RawUrlId;

/// Decides whether a link destination belongs to the crawled site.
///
/// Implementations are supplied by the caller: the crawler knows about urls that are internal but
/// were never assigned a resolvable id because a crawl policy blocked them.
pub trait UrlClassifier {
    /// `blocked_by_policy` is true when the link carries a disposition (robots.txt, crawl config)
    /// that prevented the crawler from following it.
    fn is_internal(&self, destination: RawUrlId, blocked_by_policy: bool) -> bool;
}

/// Positive destination ids are internal, as are destinations blocked by a crawl policy: the
/// crawler only blocks urls of the crawled site.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultClassifier;

impl UrlClassifier for DefaultClassifier {
    #[inline]
    fn is_internal(&self, destination: RawUrlId, blocked_by_policy: bool) -> bool {
        destination > 0 || blocked_by_policy
    }
}

impl<T: UrlClassifier + ?Sized> UrlClassifier for &T {
    #[inline]
    fn is_internal(&self, destination: RawUrlId, blocked_by_policy: bool) -> bool {
        (**self).is_internal(destination, blocked_by_policy)
    }
}

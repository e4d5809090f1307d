mod classifier;
mod observer;

// Public exports from root of the crate.
pub use classifier::{DefaultClassifier, UrlClassifier};
pub use observer::{Counter, CountingObserver, DataQualityWarning, LogObserver, Observer};

// Universally used types.

/// External, crawl-assigned url id. Sparse, monotonically assigned.
pub type UrlId = u32;
/// Url id as found in raw edge columns, where values `<= 0` mark a destination that is not an
/// internal resolvable url.
pub type RawUrlId = i64;
/// Dense internal node id used by the PageRank engine, contiguous in `0..N`.
pub type NodeId = u32;
/// HTTP status code as recorded by the crawler. `0` means the url was not fetched.
pub type HttpCode = u16;

/// Returns the internal url id carried by a raw destination column, if any.
#[inline]
pub fn resolve_raw_id(raw: RawUrlId) -> Option<UrlId> {
    if raw > 0 {
        use std::convert::TryFrom;
        UrlId::try_from(raw).ok()
    } else {
        None
    }
}

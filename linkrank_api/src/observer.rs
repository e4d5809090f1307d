use crate::{HttpCode, UrlId};
use hashbrown::HashMap;
use log::{debug, warn};
use serde_derive::{Deserialize, Serialize};
use std::cell::RefCell;

/// Named counters reported by the streaming components.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum Counter {
    RecordsConsumed,
    RecordsSkipped,
    DocumentsEmitted,
    NodesMapped,
    ExtraNonCrawled,
    SourcesGrouped,
    GraphRecordsWritten,
    VirtualRecordsWritten,
    RankIterations,
    VirtualContributions,
    PercentileUrls,
}

/// Records that are well-formed but carry data which should never appear. They are reported and
/// skipped, never fatal.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub enum DataQualityWarning {
    /// An incoming link carries the `robots` disposition, which only makes sense for outlinks.
    InboundRobotsDisposition { id: UrlId, source: UrlId },
    /// An error link whose status code does not fall in any error bucket.
    UnclassifiedErrorCode { id: UrlId, destination: UrlId, code: HttpCode },
}

impl std::fmt::Display for DataQualityWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            DataQualityWarning::InboundRobotsDisposition { id, source } => write!(
                f,
                "[DataQuality] Skipping inlink {} -> {} with a `robots` disposition",
                source, id
            ),
            DataQualityWarning::UnclassifiedErrorCode { id, destination, code } => write!(
                f,
                "[DataQuality] Skipping error link {} -> {} with non-error code {}",
                id, destination, code
            ),
        }
    }
}

/// Observability hooks injected into every component.
pub trait Observer {
    fn on_counter(&self, _counter: Counter, _delta: u64) {}

    fn on_warning(&self, _warning: DataQualityWarning) {}
}

impl<T: Observer + ?Sized> Observer for &T {
    #[inline]
    fn on_counter(&self, counter: Counter, delta: u64) {
        (**self).on_counter(counter, delta);
    }

    #[inline]
    fn on_warning(&self, warning: DataQualityWarning) {
        (**self).on_warning(warning);
    }
}

/// Forwards warnings to the `log` facade. Counters are only visible at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogObserver;

impl Observer for LogObserver {
    fn on_counter(&self, counter: Counter, delta: u64) {
        debug!("{:?} += {}", counter, delta);
    }

    fn on_warning(&self, warning: DataQualityWarning) {
        warn!("{}", warning);
    }
}

/// Keeps counters and warnings in memory so they can be inspected after a run.
#[derive(Debug, Default)]
pub struct CountingObserver {
    counters: RefCell<HashMap<Counter, u64>>,
    warnings: RefCell<Vec<DataQualityWarning>>,
}

impl CountingObserver {
    pub fn counter(&self, counter: Counter) -> u64 {
        self.counters.borrow().get(&counter).copied().unwrap_or_default()
    }

    pub fn warnings(&self) -> Vec<DataQualityWarning> {
        self.warnings.borrow().clone()
    }
}

impl Observer for CountingObserver {
    fn on_counter(&self, counter: Counter, delta: u64) {
        *self.counters.borrow_mut().entry(counter).or_insert(0) += delta;
    }

    fn on_warning(&self, warning: DataQualityWarning) {
        self.warnings.borrow_mut().push(warning);
    }
}

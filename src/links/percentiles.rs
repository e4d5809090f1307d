//! Inlink percentiles: every crawled url is assigned an equal-population bucket of its inlink
//! weight.

use crate::error::LrError;
use crate::streams::datasets::{InRedirectCounterRecord, InlinkCounterRecord, PercentileRecord};
use crate::streams::Keyed;
use linkrank_api::{Counter, Observer, UrlId};
use std::iter::Peekable;

/// Combination key of followed links in the inlink counters.
const FOLLOW_KEY: &str = "follow";

#[derive(Debug, Copy, Clone, PartialEq, new)]
pub struct PercentileConfig {
    pub nb_quantiles: u32,
    pub include_redirects: bool,
}

impl Default for PercentileConfig {
    fn default() -> Self {
        PercentileConfig { nb_quantiles: 100, include_redirects: true }
    }
}

/// Summary of one bucket.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileStats {
    pub id: u32,
    pub min: u64,
    pub max: u64,
    pub nb_urls: u64,
    pub total_inlinks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentileSummary {
    pub domain: String,
    pub percentiles: Vec<PercentileStats>,
}

/// Sums the values of a sparse key-sorted stream for successive keys.
struct SparseCursor<I: Iterator> {
    inner: Peekable<I>,
}

impl<T: Keyed, I: Iterator<Item = Result<T, LrError>>> SparseCursor<I> {
    fn new(inner: I) -> Self {
        SparseCursor { inner: inner.peekable() }
    }

    /// Consumes every record up to `id` and sums `value` over those keyed `id`. Keys must be
    /// requested in ascending order.
    fn sum_for<F: Fn(&T) -> u64>(&mut self, id: UrlId, value: F) -> Result<u64, LrError> {
        let mut sum = 0;
        loop {
            let due = match self.inner.peek() {
                Some(Ok(record)) => record.key() <= id,
                Some(Err(_)) => true,
                None => false,
            };
            if !due {
                return Ok(sum);
            }
            match self.inner.next() {
                Some(Ok(record)) if record.key() == id => sum += value(&record),
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
                None => return Ok(sum),
            }
        }
    }
}

/// Computes the inlink weight of every crawled id up to `max_crawled_id` and assigns its bucket.
///
/// The weight is the score of the `follow` inlink counter row, plus incoming redirects when
/// `config.include_redirects` is set. Rows of any nofollow combination are ignored.
///
/// Ids are sorted by `(weight, id)` and the id at position `i` of `n` goes to bucket
/// `i * nb_quantiles / n`. The result is in ascending id order.
pub fn compute_quantiles<A, B, C>(
    crawled_ids: A,
    inlinks: B,
    redirects: C,
    max_crawled_id: UrlId,
    config: PercentileConfig,
    observer: &dyn Observer,
) -> Result<Vec<PercentileRecord>, LrError>
where
    A: Iterator<Item = Result<UrlId, LrError>>,
    B: Iterator<Item = Result<InlinkCounterRecord, LrError>>,
    C: Iterator<Item = Result<InRedirectCounterRecord, LrError>>,
{
    let mut inlinks = SparseCursor::new(inlinks);
    let mut redirects = SparseCursor::new(redirects);
    let mut weights = Vec::new();
    for id in crawled_ids {
        let id = id?;
        if id > max_crawled_id {
            break;
        }
        let mut weight =
            inlinks.sum_for(id, |r| if r.follow == FOLLOW_KEY { r.score } else { 0 })?;
        if config.include_redirects {
            weight += redirects.sum_for(id, |r| r.score)?;
        }
        weights.push((weight, id));
    }

    let nb_urls = weights.len() as u64;
    observer.on_counter(Counter::PercentileUrls, nb_urls);
    weights.sort_unstable();
    let mut records = weights
        .into_iter()
        .enumerate()
        .map(|(index, (weight, id))| {
            let bucket = index as u64 * u64::from(config.nb_quantiles) / nb_urls;
            PercentileRecord::new(id, bucket as u32, weight)
        })
        .collect::<Vec<_>>();
    records.sort_unstable_by_key(|record| record.id);
    Ok(records)
}

/// Per-bucket statistics, for non-empty buckets in ascending order.
pub fn compute_percentile_stats(records: &[PercentileRecord]) -> Vec<PercentileStats> {
    let mut stats: Vec<PercentileStats> = Vec::new();
    let mut sorted = records.iter().collect::<Vec<_>>();
    sorted.sort_by_key(|record| (record.percentile_id, record.nb_inlinks));
    for record in sorted {
        match stats.last_mut() {
            Some(last) if last.id == record.percentile_id => {
                last.max = record.nb_inlinks;
                last.nb_urls += 1;
                last.total_inlinks += record.nb_inlinks;
            }
            _ => stats.push(PercentileStats {
                id: record.percentile_id,
                min: record.nb_inlinks,
                max: record.nb_inlinks,
                nb_urls: 1,
                total_inlinks: record.nb_inlinks,
            }),
        }
    }
    stats
}

pub fn percentile_summary(records: &[PercentileRecord]) -> PercentileSummary {
    PercentileSummary {
        domain: "inlinks".to_owned(),
        percentiles: compute_percentile_stats(records),
    }
}

use crate::streams::datasets::PageRankRecord;
use linkrank_api::UrlId;
use std::cmp::Ordering;

/// Upper bound of the normalized scale.
pub const MAX_NORMALIZED: f64 = 10_f64;

/// Maps `value` log-linearly from `[min, max]` onto `[0, MAX_NORMALIZED]`.
fn normalize(value: f64, min: f64, max: f64) -> f64 {
    let log = |v: f64| v.max(f64::MIN_POSITIVE).ln();
    let range = log(max) - log(min);
    if range <= 0_f64 {
        return MAX_NORMALIZED;
    }
    MAX_NORMALIZED * (log(value) - log(min)) / range
}

/// Builds the final rows in url id order. Positions are 1-based by descending value; equal values
/// share the position of the first of them.
pub fn process_pr_result(mut values: Vec<(UrlId, f64)>) -> Vec<PageRankRecord> {
    let min = values.iter().map(|(_, v)| *v).fold(f64::INFINITY, f64::min);
    let max = values.iter().map(|(_, v)| *v).fold(f64::NEG_INFINITY, f64::max);

    values.sort_by(|(a_id, a), (b_id, b)| {
        b.partial_cmp(a).unwrap_or(Ordering::Equal).then_with(|| a_id.cmp(b_id))
    });
    let mut records = Vec::with_capacity(values.len());
    let mut position = 0;
    let mut previous = None;
    for (index, (id, value)) in values.into_iter().enumerate() {
        if previous != Some(value) {
            position = index as u32 + 1;
            previous = Some(value);
        }
        records.push(PageRankRecord::new(id, position, value, normalize(value, min, max)));
    }
    records.sort_by_key(|record| record.id);
    records
}

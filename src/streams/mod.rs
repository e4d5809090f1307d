//! Partitioned record streams.
//!
//! Every dataset is a set of gzip-compressed, tab-separated files named
//! `<dataset>.txt.<part_id>.gz`, globally sorted by their leading id column across partitions.

use linkrank_api::UrlId;

pub mod datasets;
pub mod partition;
pub mod reader;
pub mod validate;
pub mod writer;

/// Records carrying the id their dataset is sorted and partitioned on.
pub trait Keyed {
    fn key(&self) -> UrlId;
}

//! Streaming link aggregation: typed edges, per-url documents and counters, bad links, links to
//! non-canonical urls, inlink percentiles and top external domains.
//!
//! Every aggregator consumes an edge stream sorted by its key and holds the state of a single key
//! at a time.

pub mod bad_links;
pub mod counters;
pub mod disposition;
pub mod document;
pub mod edge;
pub mod inlinks;
pub mod non_canonical;
pub mod outlinks;
pub mod percentiles;
pub mod top_domains;
pub mod transducer;

//! Dataset names and their fixed, ordered column schemas.

use crate::streams::Keyed;
use linkrank_api::{HttpCode, RawUrlId, UrlId};
use serde::de::DeserializeOwned;
use serde::Serialize;

/// A dataset stored as partitioned record files.
pub trait DatasetDef {
    const NAME: &'static str;
    /// Number of columns of a full row.
    const COLUMNS: usize;
    type Record: Serialize + DeserializeOwned + Keyed;
}

macro_rules! define_dataset {
    ($dataset:ident, $name:expr, $columns:expr, $record:ident) => {
        pub struct $dataset;

        impl DatasetDef for $dataset {
            const NAME: &'static str = $name;
            const COLUMNS: usize = $columns;
            type Record = $record;
        }

        impl Keyed for $record {
            #[inline]
            fn key(&self) -> UrlId {
                self.id
            }
        }
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct InfoRecord {
    pub id: UrlId,
    pub infos_mask: u32,
    pub content_type: String,
    pub depth: u32,
    pub date_crawled: u64,
    pub http_code: HttpCode,
    pub byte_size: u64,
    pub delay_first_byte: u32,
    pub delay_last_byte: u32,
}

/// Raw outgoing edge. `bitmask` follows the crawler convention, `dst_url_id <= 0` marks a
/// destination without a resolvable id, in which case `external_url` may carry the url.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct OutlinkRecord {
    pub id: UrlId,
    pub link_type: String,
    pub bitmask: u32,
    pub dst_url_id: RawUrlId,
    #[serde(default)]
    pub external_url: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct InlinkRecord {
    pub id: UrlId,
    pub link_type: String,
    pub bitmask: u32,
    pub src_url_id: UrlId,
    #[serde(default)]
    pub text_hash: String,
    #[serde(default)]
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct BadLinkRecord {
    pub id: UrlId,
    pub dst_url_id: UrlId,
    pub http_code: HttpCode,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct BadLinkCounterRecord {
    pub id: UrlId,
    pub http_code: HttpCode,
    pub score: u64,
}

/// An internal anchor whose destination declares a canonical url other than itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct NonCanonicalLinkRecord {
    pub id: UrlId,
    pub dst_url_id: UrlId,
    /// Canonical declared by the destination, `-1` when it has no url id.
    pub canonical_url_id: RawUrlId,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct NonCanonicalLinkCounterRecord {
    pub id: UrlId,
    pub score: u64,
    pub score_unique: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct OutlinkCounterRecord {
    pub id: UrlId,
    pub follow: String,
    pub is_internal: bool,
    pub score: u64,
    pub score_unique: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct OutRedirectCounterRecord {
    pub id: UrlId,
    pub is_internal: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct OutCanonicalCounterRecord {
    pub id: UrlId,
    pub equals: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct InlinkCounterRecord {
    pub id: UrlId,
    pub follow: String,
    pub score: u64,
    pub score_unique: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct InRedirectCounterRecord {
    pub id: UrlId,
    pub score: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct InCanonicalCounterRecord {
    pub id: UrlId,
    pub score: u64,
}

/// A per-url document, serialized as compact JSON in the second column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct DocumentRecord {
    pub id: UrlId,
    pub document: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct PercentileRecord {
    pub id: UrlId,
    pub percentile_id: u32,
    pub nb_inlinks: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, new)]
pub struct PageRankRecord {
    pub id: UrlId,
    pub rank: u32,
    pub value: f64,
    pub normalized: f64,
}

define_dataset!(UrlInfos, "urlinfos", 9, InfoRecord);
define_dataset!(Outlinks, "urllinks", 5, OutlinkRecord);
define_dataset!(Inlinks, "urlinlinks", 6, InlinkRecord);
define_dataset!(BadLinks, "urlbadlinks", 3, BadLinkRecord);
define_dataset!(BadLinksCounters, "urlbadlinks_counters", 3, BadLinkCounterRecord);
define_dataset!(NonCanonicalLinks, "urllinks_to_non_canonical", 3, NonCanonicalLinkRecord);
define_dataset!(
    NonCanonicalLinksCounters,
    "urllinks_to_non_canonical_counters",
    3,
    NonCanonicalLinkCounterRecord
);
define_dataset!(OutlinksCounters, "url_out_links_counters", 5, OutlinkCounterRecord);
define_dataset!(OutRedirectCounters, "url_out_redirect_counters", 2, OutRedirectCounterRecord);
define_dataset!(
    OutCanonicalCounters,
    "url_out_canonical_counters",
    2,
    OutCanonicalCounterRecord
);
define_dataset!(InlinksCounters, "url_in_links_counters", 4, InlinkCounterRecord);
define_dataset!(InRedirectCounters, "url_in_redirect_counters", 2, InRedirectCounterRecord);
define_dataset!(InCanonicalCounters, "url_in_canonical_counters", 2, InCanonicalCounterRecord);
define_dataset!(InlinksPercentiles, "inlinks_percentiles", 3, PercentileRecord);
define_dataset!(PageRankScores, "pagerank", 4, PageRankRecord);

// Documents share one record type, so `Keyed` is implemented once here.
pub struct OutlinksDocuments;
pub struct InlinksDocuments;

impl DatasetDef for OutlinksDocuments {
    const NAME: &'static str = "url_out_links_documents";
    const COLUMNS: usize = 2;
    type Record = DocumentRecord;
}

impl DatasetDef for InlinksDocuments {
    const NAME: &'static str = "url_in_links_documents";
    const COLUMNS: usize = 2;
    type Record = DocumentRecord;
}

impl Keyed for DocumentRecord {
    #[inline]
    fn key(&self) -> UrlId {
        self.id
    }
}

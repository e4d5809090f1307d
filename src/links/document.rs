//! Per-url link documents. Sections are created when the first edge of their kind is seen, so a
//! url without any edge of a kind has no such section in its document.

use crate::error::LrError;
use crate::links::edge::ErrorBucket;
use crate::streams::datasets::DocumentRecord;
use hashbrown::HashSet;
use linkrank_api::{HttpCode, UrlId};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct FollowCounts {
    pub total: u64,
    pub unique: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct NofollowCounts {
    pub total: u64,
    /// Combination key to number of links.
    pub combinations: BTreeMap<String, u64>,
}

impl NofollowCounts {
    pub fn add(&mut self, combination_key: String) {
        self.total += 1;
        *self.combinations.entry(combination_key).or_insert(0) += 1;
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalCounts {
    pub total: u64,
    /// Number of distinct peers.
    pub unique: u64,
    pub follow: FollowCounts,
    pub nofollow: NofollowCounts,
}

/// Internal links section, shared by both directions. `urls` samples `[peer id, crawler mask]`
/// pairs, each pair at most once.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InternalLinks {
    pub nb: InternalCounts,
    pub urls: Vec<(UrlId, u32)>,
    pub urls_exists: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalFollowCounts {
    pub total: u64,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalCounts {
    pub total: u64,
    pub follow: ExternalFollowCounts,
    pub nofollow: NofollowCounts,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExternalLinks {
    pub nb: ExternalCounts,
}

/// A link destination: an internal url id, or the url itself when it has no id.
#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_id: Option<UrlId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_str: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub http_code: Option<HttpCode>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectTo {
    pub url: UrlRef,
    pub url_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingRedirect {
    pub to: RedirectTo,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalTo {
    pub url: UrlRef,
    pub equal: bool,
    pub url_exists: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingCanonical {
    pub to: CanonicalTo,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLinksBucket {
    pub nb: u64,
    pub urls: Vec<UrlId>,
    pub urls_exists: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorLinks {
    #[serde(rename = "3xx")]
    pub redirection: ErrorLinksBucket,
    #[serde(rename = "4xx")]
    pub client_error: ErrorLinksBucket,
    #[serde(rename = "5xx")]
    pub server_error: ErrorLinksBucket,
    pub total: u64,
}

impl ErrorLinks {
    pub fn bucket_mut(&mut self, bucket: ErrorBucket) -> &mut ErrorLinksBucket {
        match bucket {
            ErrorBucket::Redirection => &mut self.redirection,
            ErrorBucket::ClientError => &mut self.client_error,
            ErrorBucket::ServerError => &mut self.server_error,
        }
    }

    pub fn buckets(&self) -> [&ErrorLinksBucket; 3] {
        [&self.redirection, &self.client_error, &self.server_error]
    }

    pub fn finalize(&mut self) {
        let mut buckets = [&mut self.redirection, &mut self.client_error, &mut self.server_error];
        for bucket in buckets.iter_mut() {
            bucket.urls_exists = bucket.nb > 0;
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlinksDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlinks_internal: Option<InternalLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlinks_external: Option<ExternalLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<OutgoingRedirect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<OutgoingCanonical>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlinks_errors: Option<ErrorLinks>,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct RedirectFrom {
    pub nb: u64,
    /// `[source id, http code]` pairs, in arrival order.
    pub urls: Vec<(UrlId, HttpCode)>,
    pub urls_exists: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingRedirect {
    pub from: RedirectFrom,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalFrom {
    pub nb: u64,
    pub urls: Vec<UrlId>,
    pub urls_exists: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomingCanonical {
    pub from: CanonicalFrom,
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct InlinksDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inlinks_internal: Option<InternalLinks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect: Option<IncomingRedirect>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical: Option<IncomingCanonical>,
}

/// Transient de-duplication state of the document being built. Never serialized.
#[derive(Debug, Default)]
pub struct WorkingSets {
    /// `(peer, crawler mask)` pairs already seen.
    pub seen_links: HashSet<(UrlId, u32)>,
    /// Peers already seen.
    pub seen_urls: HashSet<UrlId>,
}

impl WorkingSets {
    pub fn has_link(&self, peer: UrlId, mask: u32) -> bool {
        self.seen_links.contains(&(peer, mask))
    }

    pub fn add(&mut self, peer: UrlId, mask: u32) {
        self.seen_links.insert((peer, mask));
        self.seen_urls.insert(peer);
    }
}

/// Adds a `[peer, mask]` sample unless the cap is reached or the pair was already seen, then
/// records the pair.
pub fn record_internal_link(
    section: &mut InternalLinks,
    working_sets: &mut WorkingSets,
    peer: UrlId,
    mask: u32,
    cap: usize,
) {
    if section.urls.len() < cap && !working_sets.has_link(peer, mask) {
        section.urls.push((peer, mask));
    }
    working_sets.add(peer, mask);
}

/// Completes an internal links section once all of its edges have been seen.
pub fn finalize_internal_links(section: &mut InternalLinks, working_sets: &WorkingSets) {
    section.nb.unique = working_sets.seen_urls.len() as u64;
    section.urls_exists = !working_sets.seen_urls.is_empty();
}

/// Serializes `document` as compact JSON in a document dataset record.
pub fn to_document_record<D: Serialize>(
    id: UrlId,
    document: &D,
) -> Result<DocumentRecord, LrError> {
    serde_json::to_string(document)
        .map(|json| DocumentRecord::new(id, json))
        .map_err(|e| LrError::Serialize(format!("document {}", id), e.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::links::document::{
        to_document_record, CanonicalTo, ErrorLinks, InlinksDocument, OutgoingCanonical,
        OutlinksDocument, UrlRef,
    };
    use crate::links::edge::ErrorBucket;

    #[test]
    fn empty_sections_are_omitted() {
        let record = to_document_record(4, &InlinksDocument::default()).expect("json");
        assert_eq!(record.id, 4);
        assert_eq!(record.document, "{}");
    }

    #[test]
    fn json_field_names() {
        let mut errors = ErrorLinks::default();
        errors.bucket_mut(ErrorBucket::ClientError).nb = 2;
        errors.total = 2;
        let document = OutlinksDocument {
            canonical: Some(OutgoingCanonical {
                to: CanonicalTo {
                    url: UrlRef { url_id: Some(4), ..UrlRef::default() },
                    equal: false,
                    url_exists: true,
                },
            }),
            outlinks_errors: Some(errors),
            ..OutlinksDocument::default()
        };
        let json = to_document_record(1, &document).expect("json").document;
        assert_eq!(
            json,
            concat!(
                r#"{"canonical":{"to":{"url":{"url_id":4},"equal":false,"url_exists":true}},"#,
                r#""outlinks_errors":{"3xx":{"nb":0,"urls":[],"urls_exists":false},"#,
                r#""4xx":{"nb":2,"urls":[],"urls_exists":false},"#,
                r#""5xx":{"nb":0,"urls":[],"urls_exists":false},"total":2}}"#
            )
        );
        let parsed: OutlinksDocument = serde_json::from_str(&json).expect("parsed");
        assert_eq!(parsed, document);
    }
}

use crate::error::LrError;
use crate::links::disposition::DispositionSet;
use crate::streams::datasets::{BadLinkRecord, InlinkRecord, OutlinkRecord};
use crate::streams::Keyed;
use linkrank_api::{
    resolve_raw_id, Counter, DataQualityWarning, HttpCode, Observer, RawUrlId, UrlId,
};
use std::convert::TryFrom;

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd)]
pub enum ErrorBucket {
    Redirection,
    ClientError,
    ServerError,
}

impl ErrorBucket {
    pub fn from_code(code: HttpCode) -> Option<Self> {
        match code {
            300..=399 => Some(ErrorBucket::Redirection),
            400..=499 => Some(ErrorBucket::ClientError),
            500..=u16::MAX => Some(ErrorBucket::ServerError),
            _ => None,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ErrorBucket::Redirection => "3xx",
            ErrorBucket::ClientError => "4xx",
            ErrorBucket::ServerError => "5xx",
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum EdgeKind {
    Anchor,
    Redirect { code: HttpCode },
    Canonical,
    Error { bucket: ErrorBucket },
}

impl EdgeKind {
    /// Parses a raw `link_type` column: `a`, `r<status>` or `canonical`.
    pub fn parse(link_type: &str) -> Result<Self, LrError> {
        match link_type {
            "a" => Ok(EdgeKind::Anchor),
            "canonical" => Ok(EdgeKind::Canonical),
            _ => link_type
                .strip_prefix('r')
                .and_then(|code| code.parse().ok())
                .map(|code| EdgeKind::Redirect { code })
                .ok_or_else(|| LrError::UnknownLinkType(link_type.to_owned())),
        }
    }
}

/// An edge keyed by its source.
#[derive(Debug, Clone, PartialEq)]
pub struct OutgoingEdge {
    pub source: UrlId,
    pub kind: EdgeKind,
    pub dispositions: Option<DispositionSet>,
    pub destination: RawUrlId,
    pub external_url: Option<String>,
}

impl OutgoingEdge {
    pub fn resolved_destination(&self) -> Option<UrlId> {
        resolve_raw_id(self.destination)
    }

    /// Anchors without an explicit disposition are followed.
    pub fn dispositions(&self) -> DispositionSet {
        self.dispositions.unwrap_or(DispositionSet::FOLLOW)
    }
}

impl TryFrom<OutlinkRecord> for OutgoingEdge {
    type Error = LrError;

    fn try_from(record: OutlinkRecord) -> Result<Self, LrError> {
        let kind = EdgeKind::parse(&record.link_type)?;
        let dispositions = match kind {
            EdgeKind::Anchor => Some(DispositionSet::from_crawler_bits(record.bitmask)?),
            _ => None,
        };
        let external_url =
            if record.external_url.is_empty() { None } else { Some(record.external_url) };
        Ok(OutgoingEdge {
            source: record.id,
            kind,
            dispositions,
            destination: record.dst_url_id,
            external_url,
        })
    }
}

impl Keyed for OutgoingEdge {
    #[inline]
    fn key(&self) -> UrlId {
        self.source
    }
}

/// An edge keyed by its destination.
#[derive(Debug, Clone, PartialEq)]
pub struct IncomingEdge {
    pub destination: UrlId,
    pub kind: EdgeKind,
    pub dispositions: Option<DispositionSet>,
    pub source: UrlId,
}

impl IncomingEdge {
    pub fn dispositions(&self) -> DispositionSet {
        self.dispositions.unwrap_or(DispositionSet::FOLLOW)
    }
}

impl TryFrom<InlinkRecord> for IncomingEdge {
    type Error = LrError;

    fn try_from(record: InlinkRecord) -> Result<Self, LrError> {
        let kind = EdgeKind::parse(&record.link_type)?;
        let dispositions = match kind {
            EdgeKind::Anchor => Some(DispositionSet::from_crawler_bits(record.bitmask)?),
            _ => None,
        };
        Ok(IncomingEdge { destination: record.id, kind, dispositions, source: record.src_url_id })
    }
}

impl Keyed for IncomingEdge {
    #[inline]
    fn key(&self) -> UrlId {
        self.destination
    }
}

/// Converts raw records into typed edges, failing on the first malformed record.
pub fn outgoing_edges<I>(records: I) -> impl Iterator<Item = Result<OutgoingEdge, LrError>>
where
    I: Iterator<Item = Result<OutlinkRecord, LrError>>,
{
    records.map(|record| record.and_then(OutgoingEdge::try_from))
}

pub fn incoming_edges<I>(records: I) -> impl Iterator<Item = Result<IncomingEdge, LrError>>
where
    I: Iterator<Item = Result<InlinkRecord, LrError>>,
{
    records.map(|record| record.and_then(IncomingEdge::try_from))
}

/// Turns bad-link records into error edges. Records whose status is not an error code are reported
/// and dropped.
pub fn error_edges<'a, I>(
    records: I,
    observer: &'a dyn Observer,
) -> impl Iterator<Item = Result<OutgoingEdge, LrError>> + 'a
where
    I: Iterator<Item = Result<BadLinkRecord, LrError>> + 'a,
{
    records.filter_map(move |record| {
        let record = match record {
            Ok(record) => record,
            Err(e) => return Some(Err(e)),
        };
        match ErrorBucket::from_code(record.http_code) {
            Some(bucket) => Some(Ok(OutgoingEdge {
                source: record.id,
                kind: EdgeKind::Error { bucket },
                dispositions: None,
                destination: RawUrlId::from(record.dst_url_id),
                external_url: None,
            })),
            None => {
                observer.on_warning(DataQualityWarning::UnclassifiedErrorCode {
                    id: record.id,
                    destination: record.dst_url_id,
                    code: record.http_code,
                });
                observer.on_counter(Counter::RecordsSkipped, 1);
                None
            }
        }
    })
}

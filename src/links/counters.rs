//! Compact per-url counters, joined against other url datasets without parsing documents.

use crate::links::disposition::Disposition;
use crate::links::edge::{EdgeKind, IncomingEdge, OutgoingEdge};
use crate::links::transducer::LinkTransducer;
use crate::streams::datasets::{
    BadLinkCounterRecord, BadLinkRecord, InCanonicalCounterRecord, InRedirectCounterRecord,
    InlinkCounterRecord, NonCanonicalLinkCounterRecord, NonCanonicalLinkRecord,
    OutCanonicalCounterRecord, OutRedirectCounterRecord, OutlinkCounterRecord,
};
use hashbrown::HashSet;
use linkrank_api::{
    Counter, DataQualityWarning, HttpCode, Observer, RawUrlId, UrlClassifier, UrlId,
};
use std::collections::BTreeMap;
use std::hash::Hash;

/// Identity of a link destination for unique counts.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum Destination {
    Id(UrlId),
    Url(String),
}

#[derive(Debug)]
struct LinkCount<T: Hash + Eq> {
    score: u64,
    peers: HashSet<T>,
}

impl<T: Hash + Eq> Default for LinkCount<T> {
    fn default() -> Self {
        LinkCount { score: 0, peers: HashSet::new() }
    }
}

impl<T: Hash + Eq> LinkCount<T> {
    fn add(&mut self, peer: T) {
        self.score += 1;
        self.peers.insert(peer);
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct OutlinkCounters {
    pub links: Vec<OutlinkCounterRecord>,
    pub redirect: Option<OutRedirectCounterRecord>,
    pub canonical: Option<OutCanonicalCounterRecord>,
}

pub struct OutlinkCounterState {
    id: UrlId,
    links: BTreeMap<(String, bool), LinkCount<Destination>>,
    redirect: Option<bool>,
    canonical: Option<bool>,
}

#[derive(new)]
pub struct OutlinkCountersTransducer<C> {
    classifier: C,
}

impl<C: UrlClassifier> LinkTransducer for OutlinkCountersTransducer<C> {
    type Edge = OutgoingEdge;
    type Accumulator = OutlinkCounterState;
    type Document = OutlinkCounters;

    fn open(&self, id: UrlId) -> OutlinkCounterState {
        OutlinkCounterState { id, links: BTreeMap::new(), redirect: None, canonical: None }
    }

    fn process(&self, state: &mut OutlinkCounterState, edge: OutgoingEdge, _: &dyn Observer) {
        match edge.kind {
            EdgeKind::Anchor => {
                let dispositions = edge.dispositions();
                let is_internal =
                    self.classifier.is_internal(edge.destination, dispositions.blocked_by_policy());
                let destination = match edge.resolved_destination() {
                    Some(id) => Destination::Id(id),
                    None => Destination::Url(edge.external_url.unwrap_or_default()),
                };
                state
                    .links
                    .entry((dispositions.combination_key(), is_internal))
                    .or_default()
                    .add(destination);
            }
            EdgeKind::Redirect { .. } => {
                state.redirect.get_or_insert(edge.destination > 0);
            }
            EdgeKind::Canonical => {
                state.canonical.get_or_insert(edge.destination == RawUrlId::from(edge.source));
            }
            EdgeKind::Error { .. } => {}
        }
    }

    fn finalize(&self, state: OutlinkCounterState) -> OutlinkCounters {
        let id = state.id;
        OutlinkCounters {
            links: state
                .links
                .into_iter()
                .map(|((follow, is_internal), count)| {
                    OutlinkCounterRecord::new(
                        id,
                        follow,
                        is_internal,
                        count.score,
                        count.peers.len() as u64,
                    )
                })
                .collect(),
            redirect: state
                .redirect
                .map(|is_internal| OutRedirectCounterRecord::new(id, is_internal)),
            canonical: state.canonical.map(|equals| OutCanonicalCounterRecord::new(id, equals)),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq)]
pub struct InlinkCounters {
    pub links: Vec<InlinkCounterRecord>,
    pub redirect: Option<InRedirectCounterRecord>,
    pub canonical: Option<InCanonicalCounterRecord>,
}

pub struct InlinkCounterState {
    id: UrlId,
    links: BTreeMap<String, LinkCount<UrlId>>,
    redirects: u64,
    canonicals: u64,
}

#[derive(Default)]
pub struct InlinkCountersTransducer;

impl LinkTransducer for InlinkCountersTransducer {
    type Edge = IncomingEdge;
    type Accumulator = InlinkCounterState;
    type Document = InlinkCounters;

    fn open(&self, id: UrlId) -> InlinkCounterState {
        InlinkCounterState { id, links: BTreeMap::new(), redirects: 0, canonicals: 0 }
    }

    fn process(
        &self,
        state: &mut InlinkCounterState,
        edge: IncomingEdge,
        observer: &dyn Observer,
    ) {
        match edge.kind {
            EdgeKind::Anchor => {
                let dispositions = edge.dispositions();
                if dispositions.contains(Disposition::Robots) {
                    observer.on_warning(DataQualityWarning::InboundRobotsDisposition {
                        id: edge.destination,
                        source: edge.source,
                    });
                    observer.on_counter(Counter::RecordsSkipped, 1);
                    return;
                }
                state.links.entry(dispositions.combination_key()).or_default().add(edge.source);
            }
            EdgeKind::Redirect { .. } => state.redirects += 1,
            EdgeKind::Canonical => {
                if edge.source != edge.destination {
                    state.canonicals += 1;
                }
            }
            EdgeKind::Error { .. } => {}
        }
    }

    fn finalize(&self, state: InlinkCounterState) -> InlinkCounters {
        let id = state.id;
        InlinkCounters {
            links: state
                .links
                .into_iter()
                .map(|(follow, count)| {
                    InlinkCounterRecord::new(id, follow, count.score, count.peers.len() as u64)
                })
                .collect(),
            redirect: Some(state.redirects)
                .filter(|score| *score > 0)
                .map(|score| InRedirectCounterRecord::new(id, score)),
            canonical: Some(state.canonicals)
                .filter(|score| *score > 0)
                .map(|score| InCanonicalCounterRecord::new(id, score)),
        }
    }
}

pub struct BadLinkCounterState {
    id: UrlId,
    codes: BTreeMap<HttpCode, u64>,
}

/// Counts bad links per source and http code, in ascending code order.
#[derive(Default)]
pub struct BadLinkCountersTransducer;

impl LinkTransducer for BadLinkCountersTransducer {
    type Edge = BadLinkRecord;
    type Accumulator = BadLinkCounterState;
    type Document = Vec<BadLinkCounterRecord>;

    fn open(&self, id: UrlId) -> BadLinkCounterState {
        BadLinkCounterState { id, codes: BTreeMap::new() }
    }

    fn process(&self, state: &mut BadLinkCounterState, record: BadLinkRecord, _: &dyn Observer) {
        *state.codes.entry(record.http_code).or_insert(0) += 1;
    }

    fn finalize(&self, state: BadLinkCounterState) -> Vec<BadLinkCounterRecord> {
        let id = state.id;
        state
            .codes
            .into_iter()
            .map(|(code, score)| BadLinkCounterRecord::new(id, code, score))
            .collect()
    }
}

pub struct NonCanonicalLinkCounterState {
    id: UrlId,
    count: LinkCount<UrlId>,
}

/// Counts the links of a source pointing to non-canonical urls, in total and per destination.
#[derive(Default)]
pub struct NonCanonicalLinkCountersTransducer;

impl LinkTransducer for NonCanonicalLinkCountersTransducer {
    type Edge = NonCanonicalLinkRecord;
    type Accumulator = NonCanonicalLinkCounterState;
    type Document = NonCanonicalLinkCounterRecord;

    fn open(&self, id: UrlId) -> NonCanonicalLinkCounterState {
        NonCanonicalLinkCounterState { id, count: LinkCount::default() }
    }

    fn process(
        &self,
        state: &mut NonCanonicalLinkCounterState,
        record: NonCanonicalLinkRecord,
        _: &dyn Observer,
    ) {
        state.count.add(record.dst_url_id);
    }

    fn finalize(&self, state: NonCanonicalLinkCounterState) -> NonCanonicalLinkCounterRecord {
        let unique = state.count.peers.len() as u64;
        NonCanonicalLinkCounterRecord::new(state.id, state.count.score, unique)
    }
}

//! Rank leaving the graph through virtual destinations.

use crate::error::LrError;
use crate::pagerank::graph_store::{RecordReader, VirtualRecord};
use crate::pagerank::grouper::{VirtualKind, VirtualTarget};
use hashbrown::HashMap;
use linkrank_api::{Counter, NodeId, Observer, UrlId};
use std::collections::BTreeMap;
use std::vec::IntoIter;

/// Rank sent by one source to one virtual destination.
#[derive(Debug, Clone, PartialEq)]
pub struct VirtualContribution {
    pub source: NodeId,
    pub target: VirtualTarget,
    pub share: f64,
}

/// Emits one contribution per virtual destination: the source's rank divided by its out-degree.
pub struct VirtualContributions<'a, I> {
    records: I,
    rank: &'a [f64],
    current: Option<(NodeId, f64, IntoIter<VirtualTarget>)>,
    observer: &'a dyn Observer,
}

impl<'a, I> VirtualContributions<'a, I>
where
    I: Iterator<Item = Result<VirtualRecord, LrError>>,
{
    pub fn new(records: I, rank: &'a [f64], observer: &'a dyn Observer) -> Self {
        VirtualContributions { records, rank, current: None, observer }
    }
}

impl<'a, I> Iterator for VirtualContributions<'a, I>
where
    I: Iterator<Item = Result<VirtualRecord, LrError>>,
{
    type Item = Result<VirtualContribution, LrError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((source, share, targets)) = &mut self.current {
                if let Some(target) = targets.next() {
                    self.observer.on_counter(Counter::VirtualContributions, 1);
                    return Some(Ok(VirtualContribution { source: *source, target, share: *share }));
                }
            }
            let record = match self.records.next()? {
                Ok(record) => record,
                Err(e) => return Some(Err(e)),
            };
            let rank = match self.rank.get(record.source as usize) {
                Some(rank) => *rank,
                None => {
                    return Some(Err(LrError::Generic(format!(
                        "Virtual record source {} is outside of the {} ranked nodes",
                        record.source,
                        self.rank.len()
                    ))))
                }
            };
            let share = rank / f64::from(record.out_degree.max(1));
            self.current = Some((record.source, share, record.destinations.into_iter()));
        }
    }
}

/// Mass received by one virtual destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualDestination {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_id: Option<UrlId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url_str: Option<String>,
    pub mass: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualSummary {
    pub total: f64,
    pub by_kind: BTreeMap<String, f64>,
    pub top_destinations: Vec<VirtualDestination>,
}

/// Aggregates contributions by kind and by destination, keeping the `nb_top` destinations that
/// receive the most mass.
pub fn summarize_virtuals<I>(contributions: I, nb_top: usize) -> Result<VirtualSummary, LrError>
where
    I: Iterator<Item = Result<VirtualContribution, LrError>>,
{
    let mut total = 0_f64;
    let mut by_kind: BTreeMap<VirtualKind, f64> = BTreeMap::new();
    let mut by_destination: HashMap<VirtualTarget, f64> = HashMap::new();
    for contribution in contributions {
        let contribution = contribution?;
        total += contribution.share;
        *by_kind.entry(contribution.target.kind).or_insert(0_f64) += contribution.share;
        *by_destination.entry(contribution.target).or_insert(0_f64) += contribution.share;
    }
    let mut destinations = by_destination.into_iter().collect::<Vec<_>>();
    // Ties are ordered by destination so the output does not depend on hashing.
    destinations.sort_by(|(a, a_mass), (b, b_mass)| {
        b_mass
            .partial_cmp(a_mass)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| (a.kind, a.url_id, &a.url_str).cmp(&(b.kind, b.url_id, &b.url_str)))
    });
    destinations.truncate(nb_top);
    Ok(VirtualSummary {
        total,
        by_kind: by_kind.into_iter().map(|(kind, mass)| (kind.label().to_owned(), mass)).collect(),
        top_destinations: destinations
            .into_iter()
            .map(|(target, mass)| VirtualDestination {
                kind: target.kind.label().to_owned(),
                url_id: target.url_id,
                url_str: target.url_str,
                mass,
            })
            .collect(),
    })
}

/// Resolves the virtual file against the final rank vector.
pub fn process_virtual_result(
    records: RecordReader<VirtualRecord>,
    rank: &[f64],
    nb_top: usize,
    observer: &dyn Observer,
) -> Result<VirtualSummary, LrError> {
    summarize_virtuals(VirtualContributions::new(records, rank, observer), nb_top)
}

use crate::error::LrError;
use crate::links::edge::{EdgeKind, OutgoingEdge};
use crate::pagerank::node_mapping::NodeMapping;
use hashbrown::HashSet;
use linkrank_api::{Counter, Observer, UrlClassifier, UrlId};
use std::iter::Peekable;

/// Why a destination does not take part in the rank iteration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
pub enum VirtualKind {
    External,
    Blocked,
    Redirect,
    Canonical,
    Nofollow,
    NonCrawled,
}

impl VirtualKind {
    pub fn label(self) -> &'static str {
        match self {
            VirtualKind::External => "external",
            VirtualKind::Blocked => "blocked",
            VirtualKind::Redirect => "redirect",
            VirtualKind::Canonical => "canonical",
            VirtualKind::Nofollow => "nofollow",
            VirtualKind::NonCrawled => "non_crawled",
        }
    }
}

/// A destination outside the graph, kept as an opaque reference.
#[derive(Debug, Clone, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct VirtualTarget {
    pub kind: VirtualKind,
    pub url_id: Option<UrlId>,
    pub url_str: Option<String>,
}

/// All outgoing links of one source.
#[derive(Debug, Clone, PartialEq)]
pub struct LinkGroup {
    pub source: UrlId,
    /// Number of links, graph and virtual.
    pub out_degree: u32,
    /// Destinations that are graph nodes, as url ids.
    pub normals: Vec<UrlId>,
    pub virtuals: Vec<VirtualTarget>,
}

/// Keeps every edge except self loops.
pub fn pagerank_filter(edge: &OutgoingEdge) -> bool {
    edge.resolved_destination() != Some(edge.source)
}

/// Groups a source-sorted edge stream by source, splitting graph destinations from virtual ones.
/// Iteration ends at the first source past `max_crawled_id`.
pub struct LinkGrouper<'a, I: Iterator, C> {
    edges: Peekable<I>,
    max_crawled_id: UrlId,
    mapping: &'a NodeMapping,
    extra_non_crawled: &'a HashSet<UrlId>,
    classifier: C,
    observer: &'a dyn Observer,
}

impl<'a, I, C> LinkGrouper<'a, I, C>
where
    I: Iterator<Item = Result<OutgoingEdge, LrError>>,
    C: UrlClassifier,
{
    pub fn new(
        edges: I,
        max_crawled_id: UrlId,
        mapping: &'a NodeMapping,
        extra_non_crawled: &'a HashSet<UrlId>,
        classifier: C,
        observer: &'a dyn Observer,
    ) -> Self {
        LinkGrouper {
            edges: edges.peekable(),
            max_crawled_id,
            mapping,
            extra_non_crawled,
            classifier,
            observer,
        }
    }

    fn add(&self, group: &mut LinkGroup, edge: OutgoingEdge) {
        let destination = edge.resolved_destination();
        let kind = match edge.kind {
            EdgeKind::Redirect { .. } => VirtualKind::Redirect,
            EdgeKind::Canonical => VirtualKind::Canonical,
            EdgeKind::Error { .. } => return,
            EdgeKind::Anchor => {
                let dispositions = edge.dispositions();
                let blocked = dispositions.blocked_by_policy();
                match destination {
                    None if self.classifier.is_internal(edge.destination, blocked) => {
                        VirtualKind::Blocked
                    }
                    None => VirtualKind::External,
                    Some(_) if !dispositions.is_follow() => VirtualKind::Nofollow,
                    Some(id)
                        if self.mapping.get_internal_id(id).is_none()
                            || self.extra_non_crawled.contains(&id) =>
                    {
                        VirtualKind::NonCrawled
                    }
                    Some(id) => {
                        group.out_degree += 1;
                        group.normals.push(id);
                        return;
                    }
                }
            }
        };
        group.out_degree += 1;
        group.virtuals.push(VirtualTarget {
            kind,
            url_id: destination,
            url_str: if destination.is_none() { edge.external_url } else { None },
        });
    }
}

impl<'a, I, C> Iterator for LinkGrouper<'a, I, C>
where
    I: Iterator<Item = Result<OutgoingEdge, LrError>>,
    C: UrlClassifier,
{
    type Item = Result<LinkGroup, LrError>;

    fn next(&mut self) -> Option<Self::Item> {
        let first = match self.edges.next()? {
            Ok(edge) => edge,
            Err(e) => return Some(Err(e)),
        };
        if first.source > self.max_crawled_id {
            return None;
        }
        let mut group = LinkGroup {
            source: first.source,
            out_degree: 0,
            normals: Vec::new(),
            virtuals: Vec::new(),
        };
        self.add(&mut group, first);
        loop {
            let same_source =
                matches!(self.edges.peek(), Some(Ok(edge)) if edge.source == group.source);
            if !same_source {
                break;
            }
            if let Some(Ok(edge)) = self.edges.next() {
                self.add(&mut group, edge);
            }
        }
        self.observer.on_counter(Counter::SourcesGrouped, 1);
        Some(Ok(group))
    }
}

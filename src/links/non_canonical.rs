use crate::error::LrError;
use crate::links::edge::{EdgeKind, OutgoingEdge};
use crate::streams::datasets::NonCanonicalLinkRecord;
use hashbrown::HashMap;
use linkrank_api::{RawUrlId, UrlId};

/// Maps every url whose first canonical points elsewhere to that canonical, `-1` when the
/// canonical has no url id. Later canonicals of the same url are ignored.
pub fn non_canonical_targets<I>(edges: I) -> Result<HashMap<UrlId, RawUrlId>, LrError>
where
    I: Iterator<Item = Result<OutgoingEdge, LrError>>,
{
    let mut targets = HashMap::new();
    let mut last_declared = None;
    for edge in edges {
        let edge = edge?;
        if edge.kind != EdgeKind::Canonical || last_declared == Some(edge.source) {
            continue;
        }
        last_declared = Some(edge.source);
        match edge.resolved_destination() {
            Some(destination) if destination == edge.source => {}
            Some(destination) => {
                targets.insert(edge.source, RawUrlId::from(destination));
            }
            None => {
                targets.insert(edge.source, -1);
            }
        }
    }
    Ok(targets)
}

/// Yields every internal anchor pointing to a url of `targets`, in source order.
pub fn links_to_non_canonical<'a, I>(
    edges: I,
    targets: &'a HashMap<UrlId, RawUrlId>,
) -> impl Iterator<Item = Result<NonCanonicalLinkRecord, LrError>> + 'a
where
    I: Iterator<Item = Result<OutgoingEdge, LrError>> + 'a,
{
    edges.filter_map(move |edge| match edge {
        Ok(edge) if edge.kind == EdgeKind::Anchor => {
            let destination = edge.resolved_destination()?;
            targets.get(&destination).map(|canonical| {
                Ok(NonCanonicalLinkRecord::new(edge.source, destination, *canonical))
            })
        }
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    })
}

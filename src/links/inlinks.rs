use crate::links::disposition::Disposition;
use crate::links::document::{
    finalize_internal_links, record_internal_link, IncomingCanonical, IncomingRedirect,
    InlinksDocument, InternalLinks, WorkingSets,
};
use crate::links::edge::{EdgeKind, IncomingEdge};
use crate::links::transducer::{LinkTransducer, SampleCaps};
use linkrank_api::{Counter, DataQualityWarning, Observer, UrlId};

#[derive(Debug, Default)]
pub struct InlinksAccumulator {
    document: InlinksDocument,
    working_sets: WorkingSets,
}

/// Builds one [`InlinksDocument`] per destination url.
#[derive(new)]
pub struct InlinksTransducer {
    caps: SampleCaps,
}

impl LinkTransducer for InlinksTransducer {
    type Edge = IncomingEdge;
    type Accumulator = InlinksAccumulator;
    type Document = InlinksDocument;

    fn open(&self, _key: UrlId) -> InlinksAccumulator {
        InlinksAccumulator::default()
    }

    fn process(
        &self,
        accumulator: &mut InlinksAccumulator,
        edge: IncomingEdge,
        observer: &dyn Observer,
    ) {
        let InlinksAccumulator { document, working_sets } = accumulator;
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
                let mask = dispositions.to_crawler_bits();
                let internal = document.inlinks_internal.get_or_insert_with(InternalLinks::default);
                internal.nb.total += 1;
                if dispositions.is_follow() {
                    internal.nb.follow.total += 1;
                    if !working_sets.has_link(edge.source, mask) {
                        internal.nb.follow.unique += 1;
                    }
                } else {
                    internal.nb.nofollow.add(dispositions.combination_key());
                }
                record_internal_link(internal, working_sets, edge.source, mask, self.caps.links);
            }
            EdgeKind::Redirect { code } => {
                let from =
                    &mut document.redirect.get_or_insert_with(IncomingRedirect::default).from;
                from.nb += 1;
                if from.urls.len() < self.caps.links {
                    from.urls.push((edge.source, code));
                }
            }
            EdgeKind::Canonical => {
                // A url declaring itself canonical is no evidence for itself.
                if edge.source != edge.destination {
                    let from =
                        &mut document.canonical.get_or_insert_with(IncomingCanonical::default).from;
                    from.nb += 1;
                    if from.urls.len() < self.caps.links {
                        from.urls.push(edge.source);
                    }
                }
            }
            EdgeKind::Error { .. } => {}
        }
    }

    fn finalize(&self, accumulator: InlinksAccumulator) -> InlinksDocument {
        let InlinksAccumulator { mut document, working_sets } = accumulator;
        if let Some(internal) = document.inlinks_internal.as_mut() {
            finalize_internal_links(internal, &working_sets);
        }
        if let Some(redirect) = document.redirect.as_mut() {
            redirect.from.urls_exists = redirect.from.nb > 0;
        }
        if let Some(canonical) = document.canonical.as_mut() {
            canonical.from.urls_exists = canonical.from.nb > 0;
        }
        document
    }
}

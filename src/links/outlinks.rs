use crate::links::document::{
    finalize_internal_links, record_internal_link, CanonicalTo, ErrorLinks, ExternalLinks,
    InternalLinks, OutgoingCanonical, OutgoingRedirect, OutlinksDocument, RedirectTo, UrlRef,
    WorkingSets,
};
use crate::links::edge::{EdgeKind, ErrorBucket, OutgoingEdge};
use crate::links::transducer::{LinkTransducer, SampleCaps};
use linkrank_api::{resolve_raw_id, HttpCode, Observer, RawUrlId, UrlClassifier, UrlId};

#[derive(Debug, Default)]
pub struct OutlinksAccumulator {
    document: OutlinksDocument,
    working_sets: WorkingSets,
}

/// Builds one [`OutlinksDocument`] per source url.
#[derive(new)]
pub struct OutlinksTransducer<C> {
    classifier: C,
    caps: SampleCaps,
}

impl<C: UrlClassifier> OutlinksTransducer<C> {
    fn process_anchor(&self, accumulator: &mut OutlinksAccumulator, edge: &OutgoingEdge) {
        let dispositions = edge.dispositions();
        let is_follow = dispositions.is_follow();
        let mask = dispositions.to_crawler_bits();
        let destination = edge.resolved_destination();
        let OutlinksAccumulator { document, working_sets } = accumulator;

        if !self.classifier.is_internal(edge.destination, dispositions.blocked_by_policy()) {
            let external = document.outlinks_external.get_or_insert_with(ExternalLinks::default);
            external.nb.total += 1;
            if is_follow {
                external.nb.follow.total += 1;
            } else {
                external.nb.nofollow.add(dispositions.combination_key());
            }
            return;
        }

        let internal = document.outlinks_internal.get_or_insert_with(InternalLinks::default);
        internal.nb.total += 1;
        if is_follow {
            internal.nb.follow.total += 1;
            let seen = destination.map_or(false, |id| working_sets.has_link(id, mask));
            if !seen {
                internal.nb.follow.unique += 1;
            }
        } else {
            internal.nb.nofollow.add(dispositions.combination_key());
        }
        // Internal destinations blocked by robots.txt or the crawl config have no id.
        if let Some(id) = destination {
            record_internal_link(internal, working_sets, id, mask, self.caps.links);
        }
    }
}

fn url_ref(
    destination: RawUrlId,
    external_url: Option<String>,
    http_code: Option<HttpCode>,
) -> UrlRef {
    match resolve_raw_id(destination) {
        Some(id) => UrlRef { url_id: Some(id), url_str: None, http_code },
        None => UrlRef { url_id: None, url_str: external_url, http_code },
    }
}

impl<C: UrlClassifier> LinkTransducer for OutlinksTransducer<C> {
    type Edge = OutgoingEdge;
    type Accumulator = OutlinksAccumulator;
    type Document = OutlinksDocument;

    fn open(&self, _key: UrlId) -> OutlinksAccumulator {
        OutlinksAccumulator::default()
    }

    fn process(&self, accumulator: &mut OutlinksAccumulator, edge: OutgoingEdge, _: &dyn Observer) {
        match edge.kind {
            EdgeKind::Anchor => self.process_anchor(accumulator, &edge),
            EdgeKind::Redirect { code } => {
                // Only the first redirect of a source is kept.
                if accumulator.document.redirect.is_none() {
                    accumulator.document.redirect = Some(OutgoingRedirect {
                        to: RedirectTo {
                            url: url_ref(edge.destination, edge.external_url, Some(code)),
                            url_exists: true,
                        },
                    });
                }
            }
            EdgeKind::Canonical => {
                // Only the first canonical of a source is kept.
                if accumulator.document.canonical.is_none() {
                    accumulator.document.canonical = Some(OutgoingCanonical {
                        to: CanonicalTo {
                            equal: edge.destination == RawUrlId::from(edge.source),
                            url: url_ref(edge.destination, edge.external_url, None),
                            url_exists: true,
                        },
                    });
                }
            }
            EdgeKind::Error { bucket } => {
                let errors =
                    accumulator.document.outlinks_errors.get_or_insert_with(ErrorLinks::default);
                add_error_link(errors, bucket, edge.resolved_destination(), self.caps.error_links);
            }
        }
    }

    fn finalize(&self, accumulator: OutlinksAccumulator) -> OutlinksDocument {
        let OutlinksAccumulator { mut document, working_sets } = accumulator;
        if let Some(internal) = document.outlinks_internal.as_mut() {
            finalize_internal_links(internal, &working_sets);
        }
        if let Some(errors) = document.outlinks_errors.as_mut() {
            errors.finalize();
        }
        document
    }
}

fn add_error_link(
    errors: &mut ErrorLinks,
    bucket: ErrorBucket,
    destination: Option<UrlId>,
    cap: usize,
) {
    errors.total += 1;
    let bucket = errors.bucket_mut(bucket);
    bucket.nb += 1;
    if let Some(id) = destination {
        if bucket.urls.len() < cap {
            bucket.urls.push(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::links::disposition::DispositionSet;
    use crate::links::document::{OutlinksDocument, UrlRef};
    use crate::links::edge::{EdgeKind, ErrorBucket, OutgoingEdge};
    use crate::links::outlinks::OutlinksTransducer;
    use crate::links::transducer::{LinkTransducer, SampleCaps};
    use linkrank_api::{CountingObserver, DefaultClassifier, RawUrlId, UrlId};
    use std::collections::BTreeMap;

    fn anchor(
        source: UrlId,
        crawler_mask: u32,
        destination: RawUrlId,
        url: Option<&str>,
    ) -> OutgoingEdge {
        OutgoingEdge {
            source,
            kind: EdgeKind::Anchor,
            dispositions: Some(DispositionSet::from_crawler_bits(crawler_mask).expect("mask")),
            destination,
            external_url: url.map(str::to_owned),
        }
    }

    fn other(source: UrlId, kind: EdgeKind, destination: RawUrlId) -> OutgoingEdge {
        OutgoingEdge { source, kind, dispositions: None, destination, external_url: None }
    }

    fn run(edges: Vec<OutgoingEdge>, caps: SampleCaps) -> Vec<(UrlId, OutlinksDocument)> {
        let observer = CountingObserver::default();
        OutlinksTransducer::new(DefaultClassifier, caps)
            .documents(edges.into_iter().map(Ok), &observer)
            .collect::<Result<Vec<_>, _>>()
            .expect("documents")
    }

    fn assert_document_bounds(document: &OutlinksDocument, caps: SampleCaps) {
        if let Some(internal) = &document.outlinks_internal {
            assert!(internal.nb.unique <= internal.nb.total);
            assert!(internal.nb.follow.unique <= internal.nb.follow.total);
            assert!(internal.urls.len() <= caps.links);
            assert_eq!(internal.urls_exists, internal.nb.unique > 0);
        }
        if let Some(errors) = &document.outlinks_errors {
            for bucket in errors.buckets().iter() {
                assert!(bucket.urls.len() <= caps.error_links);
                assert_eq!(bucket.urls_exists, bucket.nb > 0);
            }
        }
    }

    #[test]
    fn source_with_every_link_kind() {
        let edges = vec![
            anchor(10, 0, 20, None),
            anchor(10, 0, 20, None),
            anchor(10, 2, 30, None),
            anchor(10, 0, -1, Some("ext.com")),
            other(10, EdgeKind::Redirect { code: 301 }, 40),
            other(10, EdgeKind::Canonical, 10),
        ];
        let documents = run(edges, SampleCaps::default());
        assert_eq!(documents.len(), 1);
        let (id, document) = &documents[0];
        assert_eq!(*id, 10);

        let internal = document.outlinks_internal.as_ref().expect("internal");
        assert_eq!(internal.nb.total, 3);
        assert_eq!(internal.nb.follow.total, 2);
        assert_eq!(internal.nb.follow.unique, 1);
        assert_eq!(internal.nb.nofollow.total, 1);
        assert_eq!(
            internal.nb.nofollow.combinations,
            vec![("meta".to_owned(), 1)].into_iter().collect::<BTreeMap<_, _>>()
        );
        assert_eq!(internal.nb.unique, 2);
        assert_eq!(internal.urls, vec![(20, 0), (30, 2)]);
        assert!(internal.urls_exists);

        let external = document.outlinks_external.as_ref().expect("external");
        assert_eq!(external.nb.total, 1);
        assert_eq!(external.nb.follow.total, 1);
        assert_eq!(external.nb.nofollow.total, 0);

        let redirect = &document.redirect.as_ref().expect("redirect").to;
        assert_eq!(redirect.url, UrlRef { url_id: Some(40), url_str: None, http_code: Some(301) });
        assert!(redirect.url_exists);

        let canonical = &document.canonical.as_ref().expect("canonical").to;
        assert!(canonical.equal);
        assert_eq!(canonical.url.url_id, Some(10));
        assert_document_bounds(document, SampleCaps::default());
    }

    #[test]
    fn first_redirect_and_canonical_win() {
        let mut external_redirect = other(1, EdgeKind::Redirect { code: 302 }, -1);
        external_redirect.external_url = Some("http://other.com/".to_owned());
        let edges = vec![
            external_redirect,
            other(1, EdgeKind::Redirect { code: 301 }, 5),
            other(1, EdgeKind::Canonical, 8),
            other(1, EdgeKind::Canonical, 1),
        ];
        let documents = run(edges, SampleCaps::default());
        let document = &documents[0].1;
        assert_eq!(
            document.redirect.as_ref().expect("redirect").to.url,
            UrlRef {
                url_id: None,
                url_str: Some("http://other.com/".to_owned()),
                http_code: Some(302)
            }
        );
        let canonical = &document.canonical.as_ref().expect("canonical").to;
        assert!(!canonical.equal);
        assert_eq!(canonical.url.url_id, Some(8));
        assert!(document.outlinks_internal.is_none());
    }

    #[test]
    fn caps_and_flags() {
        let caps = SampleCaps::new(2, 1);
        let mut edges =
            (1..=5).map(|destination| anchor(3, 0, destination, None)).collect::<Vec<_>>();
        // Blocked by robots.txt: internal, but without a destination id.
        edges.push(anchor(3, 4, 0, Some("http://site.com/private")));
        let client_error = EdgeKind::Error { bucket: ErrorBucket::ClientError };
        edges.extend((10..13).map(|destination| other(3, client_error, destination)));
        edges.push(other(4, EdgeKind::Error { bucket: ErrorBucket::ServerError }, 11));

        let documents = run(edges, caps);
        assert_eq!(documents.len(), 2);
        for (_, document) in &documents {
            assert_document_bounds(document, caps);
        }

        let internal = documents[0].1.outlinks_internal.as_ref().expect("internal");
        assert_eq!(internal.urls, vec![(1, 0), (2, 0)]);
        assert_eq!(internal.nb.unique, 5);
        assert_eq!(internal.nb.total, 6);
        assert_eq!(internal.nb.nofollow.combinations.get("robots"), Some(&1));

        let errors = documents[0].1.outlinks_errors.as_ref().expect("errors");
        assert_eq!(errors.total, 3);
        assert_eq!(errors.client_error.nb, 3);
        assert_eq!(errors.client_error.urls, vec![10]);
        assert!(!errors.server_error.urls_exists);

        let errors = documents[1].1.outlinks_errors.as_ref().expect("errors");
        assert!(errors.server_error.urls_exists);
        assert!(documents[1].1.outlinks_internal.is_none());
    }

    #[test]
    fn replay_is_identical() {
        let edges = vec![
            anchor(2, 1, 3, None),
            anchor(2, 0, 9, None),
            anchor(2, 3, 4, None),
            anchor(2, 0, -1, Some("http://a.com")),
            anchor(5, 0, 2, None),
        ];
        let render = |documents: Vec<(UrlId, OutlinksDocument)>| {
            documents
                .into_iter()
                .map(|(id, document)| {
                    format!("{}\t{}", id, serde_json::to_string(&document).expect("json"))
                })
                .collect::<Vec<_>>()
        };
        let first = render(run(edges.clone(), SampleCaps::default()));
        let second = render(run(edges, SampleCaps::default()));
        assert_eq!(first, second);
        assert!(first[0].contains(r#""combinations":{"link":1,"link_meta":1}"#));
    }
}

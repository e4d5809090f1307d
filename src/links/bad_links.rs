use crate::error::LrError;
use crate::links::edge::{EdgeKind, OutgoingEdge};
use crate::streams::datasets::{BadLinkRecord, InfoRecord};
use hashbrown::HashMap;
use linkrank_api::{HttpCode, UrlId};

/// Smallest http code considered an error for a link destination.
pub const MIN_BAD_LINK_CODE: HttpCode = 300;

/// Collects the http code of every url whose code makes it a bad link destination.
pub fn bad_link_codes<I>(infos: I) -> Result<HashMap<UrlId, HttpCode>, LrError>
where
    I: Iterator<Item = Result<InfoRecord, LrError>>,
{
    let mut codes = HashMap::new();
    for info in infos {
        let info = info?;
        if info.http_code >= MIN_BAD_LINK_CODE {
            codes.insert(info.id, info.http_code);
        }
    }
    Ok(codes)
}

/// Yields `(source, destination, code)` for every internal anchor pointing to a bad url, in
/// source order.
pub fn bad_links<'a, I>(
    edges: I,
    codes: &'a HashMap<UrlId, HttpCode>,
) -> impl Iterator<Item = Result<BadLinkRecord, LrError>> + 'a
where
    I: Iterator<Item = Result<OutgoingEdge, LrError>> + 'a,
{
    edges.filter_map(move |edge| match edge {
        Ok(edge) if edge.kind == EdgeKind::Anchor => {
            let destination = edge.resolved_destination()?;
            codes
                .get(&destination)
                .map(|code| Ok(BadLinkRecord::new(edge.source, destination, *code)))
        }
        Ok(_) => None,
        Err(e) => Some(Err(e)),
    })
}

#[cfg(test)]
mod tests {
    use crate::links::bad_links::{bad_link_codes, bad_links};
    use crate::links::edge::outgoing_edges;
    use crate::streams::datasets::{BadLinkRecord, InfoRecord, OutlinkRecord};

    fn info(id: u32, http_code: u16) -> InfoRecord {
        InfoRecord::new(id, 0, "text/html".to_owned(), 1, 0, http_code, 0, 0, 0)
    }

    fn link(source: u32, link_type: &str, destination: i64) -> OutlinkRecord {
        OutlinkRecord::new(source, link_type.to_owned(), 0, destination, String::new())
    }

    #[test]
    fn links_to_error_urls() {
        let infos = vec![info(1, 200), info(2, 404), info(3, 301), info(4, 0), info(5, 503)];
        let codes = bad_link_codes(infos.into_iter().map(Ok)).expect("codes");
        assert_eq!(codes.len(), 3);

        let links = vec![
            link(1, "a", 2),
            link(1, "a", 4),
            link(1, "r301", 2),
            link(1, "a", -1),
            link(2, "a", 3),
            link(2, "canonical", 5),
            link(3, "a", 5),
        ];
        let records = bad_links(outgoing_edges(links.into_iter().map(Ok)), &codes)
            .collect::<Result<Vec<_>, _>>()
            .expect("bad links");
        assert_eq!(
            records,
            vec![
                BadLinkRecord::new(1, 2, 404),
                BadLinkRecord::new(2, 3, 301),
                BadLinkRecord::new(3, 5, 503),
            ]
        );
    }
}

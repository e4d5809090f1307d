//! Out-of-core PageRank.
//!
//! The pipeline makes one pass over `urlinfos` to map url ids onto dense node ids, one pass over
//! `urllinks` to write the graph and virtual files, then iterates over the graph file without ever
//! loading the adjacency in memory. The rank vector and the node mapping are the only structures
//! whose size grows with the number of urls.

use crate::error::LrError;
use crate::links::edge::OutgoingEdge;
use crate::pagerank::graph_store::{write_graph_files, RecordReader};
use crate::pagerank::grouper::{pagerank_filter, LinkGrouper};
use crate::pagerank::node_mapping::build_node_mapping;
use crate::pagerank::rank::{compute_page_rank, PageRankConfig};
use crate::pagerank::results::process_pr_result;
use crate::pagerank::virtuals::{process_virtual_result, VirtualSummary};
use crate::streams::datasets::{InfoRecord, PageRankRecord};
use crate::util::memory_usage::print_memory_usage;
use crate::util::timer::LrTimer;
use linkrank_api::{Observer, UrlClassifier, UrlId};
use std::path::Path;

pub mod graph_store;
pub mod grouper;
pub mod node_mapping;
pub mod rank;
pub mod results;
pub mod virtuals;

/// Number of virtual destinations listed in the summary.
pub const NB_TOP_VIRTUAL_DESTINATIONS: usize = 100;

#[derive(Debug, Clone)]
pub struct PageRankOutput {
    /// One row per mapped url, in url id order.
    pub records: Vec<PageRankRecord>,
    pub virtuals: VirtualSummary,
}

/// Runs the whole PageRank pipeline. Intermediate files are written to `work_dir`.
pub fn run_page_rank<A, B, C>(
    infos: A,
    outlinks: B,
    max_crawled_id: UrlId,
    config: PageRankConfig,
    classifier: C,
    work_dir: &Path,
    observer: &dyn Observer,
) -> Result<PageRankOutput, LrError>
where
    A: Iterator<Item = Result<InfoRecord, LrError>>,
    B: Iterator<Item = Result<OutgoingEdge, LrError>>,
    C: UrlClassifier,
{
    let timer = LrTimer::now();
    let scan = build_node_mapping(infos, max_crawled_id, observer)?;
    timer.log_phase("Node mapping");
    print_memory_usage(format_args!("{} nodes mapped", scan.mapping.len()));

    let timer = LrTimer::now();
    let edges = outlinks.filter(|edge| edge.as_ref().map_or(true, pagerank_filter));
    let groups = LinkGrouper::new(
        edges,
        max_crawled_id,
        &scan.mapping,
        &scan.extra_non_crawled,
        classifier,
        observer,
    );
    let files = write_graph_files(groups, &scan.mapping, work_dir, observer)?;
    timer.log_phase("Graph files");

    let timer = LrTimer::now();
    let rank = compute_page_rank(&files.graph, config, observer)?;
    timer.log_phase("PageRank iterations");

    let timer = LrTimer::now();
    let virtuals = process_virtual_result(
        RecordReader::open(&files.virtuals)?,
        &rank,
        NB_TOP_VIRTUAL_DESTINATIONS,
        observer,
    )?;
    timer.log_phase("Virtual links");

    let values = scan.mapping.external_ids().iter().copied().zip(rank.into_iter()).collect();
    Ok(PageRankOutput { records: process_pr_result(values), virtuals })
}

#[cfg(test)]
mod tests {
    use crate::links::edge::outgoing_edges;
    use crate::pagerank::rank::PageRankConfig;
    use crate::pagerank::run_page_rank;
    use crate::streams::datasets::{InfoRecord, OutlinkRecord};
    use linkrank_api::{CountingObserver, DefaultClassifier};

    fn info(id: u32, http_code: u16) -> InfoRecord {
        InfoRecord::new(id, 0, "text/html".to_owned(), 0, 0, http_code, 0, 0, 0)
    }

    fn link(source: u32, link_type: &str, destination: i64, url: &str) -> OutlinkRecord {
        OutlinkRecord::new(source, link_type.to_owned(), 0, destination, url.to_owned())
    }

    fn run(dir: &std::path::Path) -> Vec<String> {
        let observer = CountingObserver::default();
        let infos = vec![info(1, 200), info(2, 200), info(3, 200), info(4, 0), info(9, 200)];
        let links = vec![
            link(1, "a", 2, ""),
            link(1, "a", 1, ""),
            link(1, "a", -1, "http://ext.com/"),
            link(2, "a", 1, ""),
            link(2, "a", 3, ""),
            link(3, "a", 4, ""),
            link(3, "r301", 1, ""),
            link(9, "a", 1, ""),
        ];
        let output = run_page_rank(
            infos.into_iter().map(Ok),
            outgoing_edges(links.into_iter().map(Ok)),
            4,
            PageRankConfig::default(),
            DefaultClassifier,
            dir,
            &observer,
        )
        .expect("pagerank");

        let total = output.records.iter().map(|r| r.value).sum::<f64>();
        assert!((total - 1.0).abs() < 1e-9);
        assert_eq!(output.records.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2, 3, 4]);
        assert_eq!(
            output.virtuals.by_kind.keys().collect::<Vec<_>>(),
            vec!["external", "non_crawled", "redirect"]
        );

        let mut lines = output
            .records
            .iter()
            .map(|r| format!("{}\t{}\t{}\t{}", r.id, r.rank, r.value, r.normalized))
            .collect::<Vec<_>>();
        lines.push(serde_json::to_string(&output.virtuals).expect("json"));
        lines
    }

    #[test]
    fn pipeline_is_deterministic() {
        let first = tempfile::tempdir().expect("tempdir");
        let second = tempfile::tempdir().expect("tempdir");
        assert_eq!(run(first.path()), run(second.path()));
    }
}

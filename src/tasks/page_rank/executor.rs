use crate::error::LrError;
use crate::links::edge::outgoing_edges;
use crate::pagerank::run_page_rank;
use crate::streams::datasets::{Outlinks, PageRankScores, UrlInfos};
use crate::tasks::page_rank::{PageRankTask, VIRTUALS_FILE};
use crate::tasks::{LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;
use linkrank_api::DefaultClassifier;
use log::info;

impl LinkTask for PageRankTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let max_crawled_id = context.max_crawled_id()?;
        info!("Computing pagerank up to url id {}", max_crawled_id);
        let output = run_page_rank(
            context.load::<UrlInfos>(None)?,
            outgoing_edges(context.load::<Outlinks>(None)?),
            max_crawled_id,
            context.settings.pagerank(),
            DefaultClassifier,
            context.tmp_dir(),
            context.observer(),
        )?;

        let timer = LrTimer::now();
        let mut uris = vec![context.push_json(VIRTUALS_FILE, &output.virtuals)?];
        uris.extend(context.persist::<PageRankScores, _>(output.records.into_iter().map(Ok))?);
        timer.log_phase("Pagerank results");
        Ok(TaskResult::new(uris))
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::streams::datasets::{
        InfoRecord, OutlinkRecord, Outlinks, PageRankScores, UrlInfos,
    };
    use crate::tasks::page_rank::{PageRankTask, VIRTUALS_FILE};
    use crate::tasks::test_utils::Fixture;
    use crate::tasks::LinkTask;
    use linkrank_api::{Counter, CountingObserver};
    use std::rc::Rc;

    fn info(id: u32) -> InfoRecord {
        InfoRecord::new(id, 0, "text/html".to_owned(), 1, 0, 200, 0, 0, 0)
    }

    fn anchor(source: u32, destination: u32) -> OutlinkRecord {
        OutlinkRecord::new(source, "a".to_owned(), 0, i64::from(destination), String::new())
    }

    #[test]
    fn two_node_cycle() {
        let fixture = Fixture::new().with_crawl_info(2);
        fixture.write::<UrlInfos>(vec![info(1), info(2)]);
        fixture.write::<Outlinks>(vec![anchor(1, 2), anchor(2, 1)]);
        let observer = Rc::new(CountingObserver::default());
        let context = fixture.context(Settings::default(), Rc::clone(&observer));

        let result = PageRankTask.execute(&context).expect("executed");
        assert_eq!(result.uris.len(), 2);
        assert!(result.uris[0].ends_with(VIRTUALS_FILE));
        assert!(result.uris[1].ends_with("pagerank.txt.0.gz"));

        let records = fixture.read::<PageRankScores>();
        let ranks = records.iter().map(|r| (r.id, r.rank)).collect::<Vec<_>>();
        assert_eq!(ranks, vec![(1, 1), (2, 1)]);
        for record in &records {
            assert!((record.value - 0.5).abs() < 1e-9);
        }
        assert_eq!(observer.counter(Counter::NodesMapped), 2);

        let virtuals = fixture.read_json(VIRTUALS_FILE);
        assert_eq!(virtuals["total"], serde_json::json!(0.0));
    }
}

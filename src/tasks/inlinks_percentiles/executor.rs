use crate::error::LrError;
use crate::links::percentiles::{compute_quantiles, percentile_summary};
use crate::streams::datasets::{InRedirectCounters, InlinksCounters, InlinksPercentiles, UrlInfos};
use crate::tasks::inlinks_percentiles::{InlinksPercentilesTask, PERCENTILES_FILE};
use crate::tasks::{LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;

impl LinkTask for InlinksPercentilesTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let timer = LrTimer::now();
        let max_crawled_id = context.max_crawled_id()?;
        let ids = context.load::<UrlInfos>(None)?.map(|info| info.map(|info| info.id));
        let inlinks = context.load_optional::<InlinksCounters>(None)?;
        let redirects = context.load_optional::<InRedirectCounters>(None)?;

        // One small record per crawled url.
        let records = compute_quantiles(
            ids,
            inlinks.into_iter().flatten(),
            redirects.into_iter().flatten(),
            max_crawled_id,
            context.settings.percentiles(),
            context.observer(),
        )?;
        timer.log_phase("Inlinks quantiles");

        let mut uris = vec![context.push_json(PERCENTILES_FILE, &percentile_summary(&records))?];
        uris.extend(context.persist::<InlinksPercentiles, _>(records.into_iter().map(Ok))?);
        Ok(TaskResult::new(uris))
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::streams::datasets::{
        InRedirectCounterRecord, InRedirectCounters, InfoRecord, InlinkCounterRecord,
        InlinksCounters, InlinksPercentiles, PercentileRecord, UrlInfos,
    };
    use crate::tasks::inlinks_percentiles::{InlinksPercentilesTask, PERCENTILES_FILE};
    use crate::tasks::test_utils::Fixture;
    use crate::tasks::LinkTask;
    use linkrank_api::{Counter, CountingObserver};
    use serde_json::json;
    use std::rc::Rc;

    fn info(id: u32) -> InfoRecord {
        InfoRecord::new(id, 0, "text/html".to_owned(), 1, 0, 200, 0, 0, 0)
    }

    fn inlinks(id: u32, follow: &str, score: u64) -> InlinkCounterRecord {
        InlinkCounterRecord::new(id, follow.to_owned(), score, score)
    }

    #[test]
    fn percentiles_and_summary() {
        let fixture = Fixture::new().with_crawl_info(4);
        fixture.write::<UrlInfos>(vec![info(1), info(2), info(3), info(4), info(5)]);
        fixture.write::<InlinksCounters>(vec![
            inlinks(1, "follow", 5),
            inlinks(1, "link", 7),
            inlinks(3, "follow", 2),
            inlinks(5, "follow", 9),
        ]);
        fixture.write::<InRedirectCounters>(vec![InRedirectCounterRecord::new(4, 1)]);
        let mut settings = Settings::default();
        settings.nb_quantiles = 2;
        let observer = Rc::new(CountingObserver::default());
        let context = fixture.context(settings, Rc::clone(&observer));

        let result = InlinksPercentilesTask.execute(&context).expect("executed");
        assert_eq!(result.uris.len(), 2);
        assert_eq!(observer.counter(Counter::PercentileUrls), 4);
        // Sorted by (weight, id): 2 (0), 4 (1), 3 (2), 1 (5).
        assert_eq!(
            fixture.read::<InlinksPercentiles>(),
            vec![
                PercentileRecord::new(1, 1, 5),
                PercentileRecord::new(2, 0, 0),
                PercentileRecord::new(3, 1, 2),
                PercentileRecord::new(4, 0, 1),
            ]
        );
        assert_eq!(
            fixture.read_json(PERCENTILES_FILE),
            json!({
                "domain": "inlinks",
                "percentiles": [
                    {"id": 0, "min": 0, "max": 1, "nb_urls": 2, "total_inlinks": 1},
                    {"id": 1, "min": 2, "max": 5, "nb_urls": 2, "total_inlinks": 7},
                ]
            })
        );
    }

    #[test]
    fn without_inlinks() {
        let fixture = Fixture::new().with_crawl_info(10);
        fixture.write::<UrlInfos>(vec![info(1), info(2)]);
        let context = fixture.context(Settings::default(), Rc::new(CountingObserver::default()));

        InlinksPercentilesTask.execute(&context).expect("executed");
        assert_eq!(
            fixture.read::<InlinksPercentiles>(),
            vec![PercentileRecord::new(1, 0, 0), PercentileRecord::new(2, 50, 0)]
        );
    }
}

use crate::error::LrError;
use crate::links::edge::outgoing_edges;
use crate::links::non_canonical::{links_to_non_canonical, non_canonical_targets};
use crate::streams::datasets::{NonCanonicalLinks, Outlinks};
use crate::tasks::non_canonical_links::NonCanonicalLinksTask;
use crate::tasks::{LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;
use log::info;

impl LinkTask for NonCanonicalLinksTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let timer = LrTimer::now();
        // Canonicals are declared by destinations, so the links are read twice.
        let targets = non_canonical_targets(outgoing_edges(context.load::<Outlinks>(None)?))?;
        info!("{} urls declare a canonical pointing elsewhere", targets.len());

        let edges = outgoing_edges(context.load::<Outlinks>(None)?);
        let uris =
            context.persist::<NonCanonicalLinks, _>(links_to_non_canonical(edges, &targets))?;
        timer.log_phase(&self.to_string());
        Ok(TaskResult::new(uris))
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::streams::datasets::{
        NonCanonicalLinkRecord, NonCanonicalLinks, OutlinkRecord, Outlinks,
    };
    use crate::tasks::non_canonical_links::NonCanonicalLinksTask;
    use crate::tasks::test_utils::Fixture;
    use crate::tasks::LinkTask;
    use linkrank_api::CountingObserver;
    use std::rc::Rc;

    fn link(source: u32, link_type: &str, destination: i64) -> OutlinkRecord {
        OutlinkRecord::new(source, link_type.to_owned(), 0, destination, String::new())
    }

    #[test]
    fn non_canonical_links_across_partitions() {
        let fixture = Fixture::new();
        fixture.write::<Outlinks>(vec![
            link(1, "a", 2),
            link(1, "a", 3),
            link(2, "canonical", 2),
            link(3, "canonical", 1),
            link(3, "a", 4),
            link(4, "canonical", 1),
            link(4, "a", 3),
            link(4, "r301", 3),
        ]);
        let mut settings = Settings::default();
        settings.first_part_size = 2;
        settings.part_size = 4;
        let context = fixture.context(settings, Rc::new(CountingObserver::default()));

        let result = NonCanonicalLinksTask.execute(&context).expect("executed");
        assert_eq!(result.uris.len(), 2);
        assert!(result.uris[0].ends_with("urllinks_to_non_canonical.txt.0.gz"));
        assert!(result.uris[1].ends_with("urllinks_to_non_canonical.txt.1.gz"));
        assert_eq!(
            fixture.read::<NonCanonicalLinks>(),
            vec![
                NonCanonicalLinkRecord::new(1, 3, 1),
                NonCanonicalLinkRecord::new(3, 4, 1),
                NonCanonicalLinkRecord::new(4, 3, 1),
            ]
        );
    }
}

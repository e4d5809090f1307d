use crate::error::LrError;
use crate::links::counters::{InlinkCountersTransducer, OutlinkCountersTransducer};
use crate::links::edge::{incoming_edges, outgoing_edges};
use crate::links::transducer::LinkTransducer;
use crate::streams::datasets::{
    InCanonicalCounters, InRedirectCounters, Inlinks, InlinksCounters, OutCanonicalCounters,
    OutRedirectCounters, Outlinks, OutlinksCounters,
};
use crate::streams::writer::LazyPartitionWriter;
use crate::tasks::link_counters::LinkCountersTask;
use crate::tasks::{LinkDirection, LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;
use linkrank_api::DefaultClassifier;
use std::path::PathBuf;

impl LinkTask for LinkCountersTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let timer = LrTimer::now();
        let written = match self.direction {
            LinkDirection::Out => self.outlinks_counters(context)?,
            LinkDirection::In => self.inlinks_counters(context)?,
        };
        timer.log_phase(&self.to_string());

        let mut result = TaskResult::new(context.push_files(&written)?);
        if !written.is_empty() {
            result.part_id = Some(self.part_id);
        }
        Ok(result)
    }
}

impl LinkCountersTask {
    fn outlinks_counters(&self, context: &TaskContext) -> Result<Vec<PathBuf>, LrError> {
        let edges = outgoing_edges(context.load::<Outlinks>(Some(self.part_id))?);
        let dir = context.tmp_dir();
        let mut links = LazyPartitionWriter::<OutlinksCounters>::new(dir, self.part_id);
        let mut redirects = LazyPartitionWriter::<OutRedirectCounters>::new(dir, self.part_id);
        let mut canonicals = LazyPartitionWriter::<OutCanonicalCounters>::new(dir, self.part_id);
        let transducer = OutlinkCountersTransducer::new(DefaultClassifier);
        for counters in transducer.documents(edges, context.observer()) {
            let (_, counters) = counters?;
            for record in &counters.links {
                links.write(record)?;
            }
            if let Some(record) = &counters.redirect {
                redirects.write(record)?;
            }
            if let Some(record) = &counters.canonical {
                canonicals.write(record)?;
            }
        }
        Ok(vec![links.finish()?, redirects.finish()?, canonicals.finish()?]
            .into_iter()
            .flatten()
            .collect())
    }

    fn inlinks_counters(&self, context: &TaskContext) -> Result<Vec<PathBuf>, LrError> {
        let edges = incoming_edges(context.load::<Inlinks>(Some(self.part_id))?);
        let dir = context.tmp_dir();
        let mut links = LazyPartitionWriter::<InlinksCounters>::new(dir, self.part_id);
        let mut redirects = LazyPartitionWriter::<InRedirectCounters>::new(dir, self.part_id);
        let mut canonicals = LazyPartitionWriter::<InCanonicalCounters>::new(dir, self.part_id);
        for counters in InlinkCountersTransducer.documents(edges, context.observer()) {
            let (_, counters) = counters?;
            for record in &counters.links {
                links.write(record)?;
            }
            if let Some(record) = &counters.redirect {
                redirects.write(record)?;
            }
            if let Some(record) = &counters.canonical {
                canonicals.write(record)?;
            }
        }
        Ok(vec![links.finish()?, redirects.finish()?, canonicals.finish()?]
            .into_iter()
            .flatten()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::streams::datasets::{
        InlinkCounterRecord, InlinkRecord, Inlinks, InlinksCounters, OutRedirectCounterRecord,
        OutRedirectCounters, OutlinkCounterRecord, OutlinkRecord, Outlinks, OutlinksCounters,
    };
    use crate::tasks::link_counters::LinkCountersTask;
    use crate::tasks::test_utils::Fixture;
    use crate::tasks::{LinkDirection, LinkTask};
    use linkrank_api::CountingObserver;
    use std::rc::Rc;

    fn file_names(uris: &[String]) -> Vec<&str> {
        uris.iter().map(|uri| uri.rsplit('/').next().expect("name")).collect()
    }

    #[test]
    fn outlinks_counters_files() {
        let fixture = Fixture::new();
        fixture.write::<Outlinks>(vec![
            OutlinkRecord::new(1, "a".to_owned(), 0, 2, String::new()),
            OutlinkRecord::new(1, "a".to_owned(), 0, 2, String::new()),
            OutlinkRecord::new(1, "a".to_owned(), 1, -1, "http://ext.com/".to_owned()),
            OutlinkRecord::new(3, "r302".to_owned(), 0, 1, String::new()),
        ]);
        let context = fixture.context(Settings::default(), Rc::new(CountingObserver::default()));

        let result =
            LinkCountersTask::new(0, LinkDirection::Out).execute(&context).expect("executed");
        assert_eq!(result.part_id, Some(0));
        assert_eq!(
            file_names(&result.uris),
            vec!["url_out_links_counters.txt.0.gz", "url_out_redirect_counters.txt.0.gz"]
        );
        assert_eq!(
            fixture.read::<OutlinksCounters>(),
            vec![
                OutlinkCounterRecord::new(1, "follow".to_owned(), true, 2, 1),
                OutlinkCounterRecord::new(1, "link".to_owned(), false, 1, 1),
            ]
        );
        assert_eq!(
            fixture.read::<OutRedirectCounters>(),
            vec![OutRedirectCounterRecord::new(3, true)]
        );
    }

    #[test]
    fn inlinks_counters_files() {
        let fixture = Fixture::new();
        fixture.write::<Inlinks>(vec![
            InlinkRecord::new(5, "a".to_owned(), 0, 1, String::new(), String::new()),
            InlinkRecord::new(5, "a".to_owned(), 0, 2, String::new(), String::new()),
            InlinkRecord::new(5, "a".to_owned(), 0, 2, String::new(), String::new()),
        ]);
        let context = fixture.context(Settings::default(), Rc::new(CountingObserver::default()));

        let result =
            LinkCountersTask::new(0, LinkDirection::In).execute(&context).expect("executed");
        assert_eq!(file_names(&result.uris), vec!["url_in_links_counters.txt.0.gz"]);
        assert_eq!(
            fixture.read::<InlinksCounters>(),
            vec![InlinkCounterRecord::new(5, "follow".to_owned(), 3, 2)]
        );
    }
}

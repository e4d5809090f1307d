use crate::error::LrError;
use crate::links::counters::BadLinkCountersTransducer;
use crate::links::transducer::LinkTransducer;
use crate::streams::datasets::{BadLinks, BadLinksCounters};
use crate::streams::writer::write_partition;
use crate::tasks::bad_link_counters::BadLinkCountersTask;
use crate::tasks::{LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;

impl LinkTask for BadLinkCountersTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let timer = LrTimer::now();
        let records = BadLinkCountersTransducer
            .documents(context.load::<BadLinks>(Some(self.part_id))?, context.observer())
            .flat_map(|counters| match counters {
                Ok((_, records)) => records.into_iter().map(Ok).collect::<Vec<_>>(),
                Err(e) => vec![Err(e)],
            });
        let written =
            write_partition::<BadLinksCounters, _>(records, context.tmp_dir(), self.part_id)?;
        timer.log_phase(&self.to_string());

        let part_id = written.as_ref().map(|_| self.part_id);
        let written = written.into_iter().collect::<Vec<_>>();
        let mut result = TaskResult::new(context.push_files(&written)?);
        result.part_id = part_id;
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::streams::datasets::{
        BadLinkCounterRecord, BadLinkRecord, BadLinks, BadLinksCounters,
    };
    use crate::tasks::bad_link_counters::BadLinkCountersTask;
    use crate::tasks::test_utils::Fixture;
    use crate::tasks::LinkTask;
    use linkrank_api::CountingObserver;
    use std::rc::Rc;

    #[test]
    fn counts_per_code() {
        let fixture = Fixture::new();
        fixture.write::<BadLinks>(vec![
            BadLinkRecord::new(1, 5, 404),
            BadLinkRecord::new(1, 6, 301),
            BadLinkRecord::new(1, 7, 404),
            BadLinkRecord::new(2, 5, 404),
        ]);
        let context = fixture.context(Settings::default(), Rc::new(CountingObserver::default()));

        let result = BadLinkCountersTask::new(0).execute(&context).expect("executed");
        assert_eq!(result.part_id, Some(0));
        assert_eq!(
            fixture.read::<BadLinksCounters>(),
            vec![
                BadLinkCounterRecord::new(1, 301, 1),
                BadLinkCounterRecord::new(1, 404, 2),
                BadLinkCounterRecord::new(2, 404, 1),
            ]
        );
    }
}

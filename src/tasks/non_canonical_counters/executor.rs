use crate::error::LrError;
use crate::links::counters::NonCanonicalLinkCountersTransducer;
use crate::links::transducer::LinkTransducer;
use crate::streams::datasets::{NonCanonicalLinks, NonCanonicalLinksCounters};
use crate::streams::writer::write_partition;
use crate::tasks::non_canonical_counters::NonCanonicalCountersTask;
use crate::tasks::{LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;

impl LinkTask for NonCanonicalCountersTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let timer = LrTimer::now();
        let records = NonCanonicalLinkCountersTransducer
            .documents(context.load::<NonCanonicalLinks>(Some(self.part_id))?, context.observer())
            .map(|counter| counter.map(|(_, record)| record));
        let written = write_partition::<NonCanonicalLinksCounters, _>(
            records,
            context.tmp_dir(),
            self.part_id,
        )?;
        timer.log_phase(&self.to_string());

        let part_id = written.as_ref().map(|_| self.part_id);
        let written = written.into_iter().collect::<Vec<_>>();
        let mut result = TaskResult::new(context.push_files(&written)?);
        result.part_id = part_id;
        Ok(result)
    }
}

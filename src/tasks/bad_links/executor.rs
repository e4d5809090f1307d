use crate::error::LrError;
use crate::links::bad_links::{bad_link_codes, bad_links};
use crate::links::edge::outgoing_edges;
use crate::streams::datasets::{BadLinks, Outlinks, UrlInfos};
use crate::tasks::bad_links::BadLinksTask;
use crate::tasks::{LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;
use log::info;

impl LinkTask for BadLinksTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let timer = LrTimer::now();
        let codes = bad_link_codes(context.load::<UrlInfos>(None)?)?;
        info!("{} urls answered with an error code", codes.len());

        let edges = outgoing_edges(context.load::<Outlinks>(None)?);
        let uris = context.persist::<BadLinks, _>(bad_links(edges, &codes))?;
        timer.log_phase(&self.to_string());
        Ok(TaskResult::new(uris))
    }
}

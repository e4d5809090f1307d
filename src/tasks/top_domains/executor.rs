use crate::error::LrError;
use crate::links::edge::outgoing_edges;
use crate::links::top_domains::compute_top_domains;
use crate::streams::datasets::Outlinks;
use crate::tasks::top_domains::{
    TopDomainsTask, TOP_FULL_DOMAINS_FILE, TOP_SECOND_LEVEL_DOMAINS_FILE,
};
use crate::tasks::{LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;
use linkrank_api::DefaultClassifier;

impl LinkTask for TopDomainsTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let timer = LrTimer::now();
        let top_domains = compute_top_domains(
            outgoing_edges(context.load::<Outlinks>(None)?),
            &DefaultClassifier,
            context.settings.nb_top_domains,
        )?;
        timer.log_phase("Top domains");

        Ok(TaskResult::new(vec![
            context.push_json(TOP_FULL_DOMAINS_FILE, &top_domains.full_domains)?,
            context.push_json(TOP_SECOND_LEVEL_DOMAINS_FILE, &top_domains.second_level_domains)?,
        ]))
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::streams::datasets::{OutlinkRecord, Outlinks};
    use crate::tasks::test_utils::Fixture;
    use crate::tasks::top_domains::{
        TopDomainsTask, TOP_FULL_DOMAINS_FILE, TOP_SECOND_LEVEL_DOMAINS_FILE,
    };
    use crate::tasks::LinkTask;
    use linkrank_api::CountingObserver;
    use serde_json::json;
    use std::rc::Rc;

    fn external(source: u32, url: &str) -> OutlinkRecord {
        OutlinkRecord::new(source, "a".to_owned(), 0, -1, url.to_owned())
    }

    #[test]
    fn top_domain_files() {
        let fixture = Fixture::new();
        fixture.write::<Outlinks>(vec![
            external(1, "http://www.a.com/x"),
            external(1, "http://blog.a.com/"),
            external(2, "http://b.org/"),
            OutlinkRecord::new(2, "a".to_owned(), 0, 1, String::new()),
        ]);
        let mut settings = Settings::default();
        settings.nb_top_domains = 1;
        let context = fixture.context(settings, Rc::new(CountingObserver::default()));

        let result = TopDomainsTask.execute(&context).expect("executed");
        assert_eq!(result.uris.len(), 2);

        let full = fixture.read_json(TOP_FULL_DOMAINS_FILE);
        assert_eq!(full.as_array().expect("list").len(), 1);
        assert_eq!(full[0]["domain"], json!("b.org"));
        assert_eq!(
            full[0]["sample_links"],
            json!([{ "url": "http://b.org/", "source_id": 2 }])
        );

        let second_level = fixture.read_json(TOP_SECOND_LEVEL_DOMAINS_FILE);
        assert_eq!(second_level[0]["domain"], json!("a.com"));
        assert_eq!(second_level[0]["unique_links"], json!(2));
        assert_eq!(second_level[0]["nb_links"], json!(2));
    }
}

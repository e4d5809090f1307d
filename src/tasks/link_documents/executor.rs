use crate::error::LrError;
use crate::links::document::to_document_record;
use crate::links::edge::{error_edges, incoming_edges, outgoing_edges};
use crate::links::inlinks::InlinksTransducer;
use crate::links::outlinks::OutlinksTransducer;
use crate::links::transducer::{merge_by_key, LinkTransducer};
use crate::streams::datasets::{
    BadLinks, DatasetDef, DocumentRecord, Inlinks, InlinksDocuments, Outlinks, OutlinksDocuments,
};
use crate::streams::writer::write_partition;
use crate::tasks::link_documents::LinkDocumentsTask;
use crate::tasks::{LinkDirection, LinkTask, TaskContext, TaskResult};
use crate::util::timer::LrTimer;
use linkrank_api::{DefaultClassifier, UrlId};
use log::info;
use serde::Serialize;
use std::path::PathBuf;

impl LinkTask for LinkDocumentsTask {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError> {
        let timer = LrTimer::now();
        let caps = context.settings.caps();
        let observer = context.observer();
        let written = match self.direction {
            LinkDirection::Out => {
                let links = outgoing_edges(context.load::<Outlinks>(Some(self.part_id))?);
                let errors = context.load_optional::<BadLinks>(Some(self.part_id))?;
                let errors = error_edges(errors.into_iter().flatten(), observer);
                let edges = merge_by_key(links, errors);
                let documents = OutlinksTransducer::new(DefaultClassifier, caps)
                    .documents(edges, observer);
                self.write::<OutlinksDocuments, _, _>(context, documents)?
            }
            LinkDirection::In => {
                let edges = incoming_edges(context.load::<Inlinks>(Some(self.part_id))?);
                let documents = InlinksTransducer::new(caps).documents(edges, observer);
                self.write::<InlinksDocuments, _, _>(context, documents)?
            }
        };
        timer.log_phase(&self.to_string());

        let mut result = TaskResult::new(context.push_files(&written)?);
        if !written.is_empty() {
            result.part_id = Some(self.part_id);
        }
        Ok(result)
    }
}

impl LinkDocumentsTask {
    fn write<D, T, I>(&self, context: &TaskContext, documents: I) -> Result<Vec<PathBuf>, LrError>
    where
        D: DatasetDef<Record = DocumentRecord>,
        T: Serialize,
        I: Iterator<Item = Result<(UrlId, T), LrError>>,
    {
        let records = documents.map(|document| {
            document.and_then(|(id, document)| to_document_record(id, &document))
        });
        let written = write_partition::<D, _>(records, context.tmp_dir(), self.part_id)?;
        if written.is_none() {
            info!("No {} written for partition {}", D::NAME, self.part_id);
        }
        Ok(written.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::streams::datasets::{
        BadLinkRecord, BadLinks, InlinkRecord, Inlinks, InlinksDocuments, OutlinkRecord, Outlinks,
        OutlinksDocuments,
    };
    use crate::tasks::link_documents::LinkDocumentsTask;
    use crate::tasks::test_utils::Fixture;
    use crate::tasks::{LinkDirection, LinkTask};
    use linkrank_api::{CountingObserver, DataQualityWarning};
    use serde_json::json;
    use std::rc::Rc;

    fn document(fixture: &Fixture, id: u32, outgoing: bool) -> serde_json::Value {
        let records = if outgoing {
            fixture.read::<OutlinksDocuments>()
        } else {
            fixture.read::<InlinksDocuments>()
        };
        let record = records.into_iter().find(|record| record.id == id).expect("document");
        serde_json::from_str(&record.document).expect("json")
    }

    #[test]
    fn outlinks_documents_with_error_links() {
        let fixture = Fixture::new();
        fixture.write::<Outlinks>(vec![
            OutlinkRecord::new(1, "a".to_owned(), 0, 2, String::new()),
            OutlinkRecord::new(1, "a".to_owned(), 0, 3, String::new()),
            OutlinkRecord::new(2, "r301".to_owned(), 0, 1, String::new()),
        ]);
        fixture.write::<BadLinks>(vec![
            BadLinkRecord::new(1, 3, 404),
            BadLinkRecord::new(1, 4, 200),
        ]);
        let observer = Rc::new(CountingObserver::default());
        let context = fixture.context(Settings::default(), Rc::clone(&observer));

        let result =
            LinkDocumentsTask::new(0, LinkDirection::Out).execute(&context).expect("executed");
        assert_eq!(result.part_id, Some(0));
        assert_eq!(result.uris.len(), 1);
        assert!(result.uris[0].ends_with("url_out_links_documents.txt.0.gz"));

        let first = document(&fixture, 1, true);
        assert_eq!(first["outlinks_errors"]["4xx"]["nb"], json!(1));
        assert_eq!(first["outlinks_errors"]["4xx"]["urls"], json!([3]));
        assert_eq!(first["outlinks_internal"]["nb"]["total"], json!(2));
        assert_eq!(document(&fixture, 2, true)["redirect"]["to"]["url"]["url_id"], json!(1));
        assert_eq!(
            observer.warnings(),
            vec![DataQualityWarning::UnclassifiedErrorCode { id: 1, destination: 4, code: 200 }]
        );
    }

    #[test]
    fn inlinks_documents() {
        let fixture = Fixture::new();
        fixture.write::<Inlinks>(vec![
            InlinkRecord::new(2, "a".to_owned(), 0, 1, String::new(), String::new()),
            InlinkRecord::new(2, "a".to_owned(), 4, 3, String::new(), String::new()),
        ]);
        let observer = Rc::new(CountingObserver::default());
        let context = fixture.context(Settings::default(), Rc::clone(&observer));

        LinkDocumentsTask::new(0, LinkDirection::In).execute(&context).expect("executed");
        let document = document(&fixture, 2, false);
        assert_eq!(document["inlinks_internal"]["nb"]["total"], json!(1));
        assert_eq!(observer.warnings().len(), 1);
    }

    #[test]
    fn missing_partition() {
        let fixture = Fixture::new();
        fixture.write::<Outlinks>(vec![OutlinkRecord::new(
            1,
            "a".to_owned(),
            0,
            2,
            String::new(),
        )]);
        let context = fixture.context(Settings::default(), Rc::new(CountingObserver::default()));
        let error =
            LinkDocumentsTask::new(7, LinkDirection::Out).execute(&context).expect_err("missing");
        assert_eq!(error.to_string(), "[StoreError] No partition found for dataset 'urllinks'");
    }
}

//! Task functions. Each task reads its input datasets through the [`ObjectStore`], runs one of the
//! streaming computations and pushes the generated files back under the crawl uri.

use crate::error::LrError;
use crate::settings::Settings;
use crate::streams::datasets::DatasetDef;
use crate::streams::reader::{load, RecordStream};
use crate::streams::validate::{validate_order, OrderedStream};
use crate::streams::writer::{json_content, persist};
use crate::tasks::store::ObjectStore;
use linkrank_api::{Observer, UrlId};
use serde::Serialize;
use std::path::{Path, PathBuf};

pub mod bad_link_counters;
pub mod bad_links;
pub mod inlinks_percentiles;
pub mod link_counters;
pub mod link_documents;
pub mod non_canonical_counters;
pub mod non_canonical_links;
pub mod page_rank;
pub mod store;
pub mod top_domains;

/// Crawl metadata file.
pub const CRAWL_INFO_FILE: &str = "crawl_info.json";

pub type DatasetStream<D> = OrderedStream<RecordStream<<D as DatasetDef>::Record>>;

pub trait LinkTask: std::fmt::Display {
    fn execute(&self, context: &TaskContext) -> Result<TaskResult, LrError>;
}

#[derive(Debug, Default, PartialEq, new)]
pub struct TaskResult {
    /// Uris of everything the task pushed.
    pub uris: Vec<String>,
    /// Set by per-partition tasks when the partition produced at least one file.
    #[new(default)]
    pub part_id: Option<u32>,
}

impl std::fmt::Display for TaskResult {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{} file(s) generated", self.uris.len())?;
        if let Some(part_id) = self.part_id {
            write!(f, " for partition {}", part_id)?;
        }
        for uri in &self.uris {
            write!(f, "\n  {}", uri)?;
        }
        Ok(())
    }
}

/// Link direction of the per-partition tasks.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum LinkDirection {
    Out,
    In,
}

impl LinkDirection {
    pub fn label(self) -> &'static str {
        match self {
            LinkDirection::Out => "out",
            LinkDirection::In => "in",
        }
    }
}

impl std::str::FromStr for LinkDirection {
    type Err = LrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "out" => Ok(LinkDirection::Out),
            "in" => Ok(LinkDirection::In),
            _ => Err(LrError::Config(format!("Unknown link direction '{}'", s))),
        }
    }
}

impl std::fmt::Display for LinkDirection {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> Result<(), std::fmt::Error> {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Deserialize)]
struct CrawlInfo {
    max_uid_we_crawled: UrlId,
}

/// Everything a task needs from its environment.
#[derive(new)]
pub struct TaskContext {
    pub uri: String,
    pub tmp_dir: PathBuf,
    pub settings: Settings,
    pub store: Box<dyn ObjectStore>,
    pub observer: Box<dyn Observer>,
}

impl TaskContext {
    pub fn tmp_dir(&self) -> &Path {
        &self.tmp_dir
    }

    pub fn observer(&self) -> &dyn Observer {
        &*self.observer
    }

    /// Fetches `D` and streams it, rejecting records that break the id order.
    pub fn load<D: DatasetDef>(&self, part_id: Option<u32>) -> Result<DatasetStream<D>, LrError> {
        self.store.fetch_dataset(
            &self.uri,
            D::NAME,
            part_id,
            &self.tmp_dir,
            self.settings.force_fetch,
        )?;
        Ok(validate_order(D::NAME, load::<D>(&self.tmp_dir, part_id)?))
    }

    /// Like [`TaskContext::load`], for datasets a crawl may legitimately not have.
    pub fn load_optional<D: DatasetDef>(
        &self,
        part_id: Option<u32>,
    ) -> Result<Option<DatasetStream<D>>, LrError> {
        match self.load::<D>(part_id) {
            Ok(stream) => Ok(Some(stream)),
            Err(LrError::MissingDataset(_)) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Reads `max_uid_we_crawled` from the crawl metadata.
    pub fn max_crawled_id(&self) -> Result<UrlId, LrError> {
        let path = self.store.fetch_file(
            &self.uri,
            CRAWL_INFO_FILE,
            &self.tmp_dir,
            self.settings.force_fetch,
        )?;
        let content = std::fs::read(&path)
            .map_err(|e| LrError::ReadFile(path.display().to_string(), e.to_string()))?;
        let info: CrawlInfo = serde_json::from_slice(&content)
            .map_err(|e| LrError::Deserialize(CRAWL_INFO_FILE.to_owned(), e.to_string()))?;
        Ok(info.max_uid_we_crawled)
    }

    /// Partitions `records` as `D` with the configured layout and pushes every file.
    pub fn persist<D, I>(&self, records: I) -> Result<Vec<String>, LrError>
    where
        D: DatasetDef,
        I: IntoIterator<Item = Result<D::Record, LrError>>,
    {
        let files = persist::<D, I>(records, &self.tmp_dir, self.settings.layout())?;
        self.push_files(&files)
    }

    pub fn push_files(&self, files: &[PathBuf]) -> Result<Vec<String>, LrError> {
        files.iter().map(|file| self.store.push_file(&self.uri, file)).collect()
    }

    /// Pushes `value` as a JSON document named `name`.
    pub fn push_json<T: Serialize>(&self, name: &str, value: &T) -> Result<String, LrError> {
        self.store.push_content(&self.uri, name, &json_content(name, value)?)
    }
}


#[cfg(test)]
mod tests {
    use crate::settings::Settings;
    use crate::tasks::test_utils::Fixture;
    use crate::tasks::{LinkDirection, TaskResult};
    use linkrank_api::CountingObserver;
    use std::rc::Rc;

    #[test]
    fn crawl_info() {
        let fixture = Fixture::new().with_crawl_info(42);
        let context = fixture.context(Settings::default(), Rc::new(CountingObserver::default()));
        assert_eq!(context.max_crawled_id().expect("crawl info"), 42);
    }

    #[test]
    fn missing_crawl_info() {
        let fixture = Fixture::new();
        let context = fixture.context(Settings::default(), Rc::new(CountingObserver::default()));
        let error = context.max_crawled_id().expect_err("missing");
        assert!(error.to_string().starts_with("[StoreError]"), "{}", error);
    }

    #[test]
    fn directions_and_results() {
        assert_eq!("out".parse::<LinkDirection>().expect("out"), LinkDirection::Out);
        assert_eq!("in".parse::<LinkDirection>().expect("in"), LinkDirection::In);
        assert!("both".parse::<LinkDirection>().is_err());

        let mut result = TaskResult::new(vec!["file:///a".to_owned()]);
        result.part_id = Some(3);
        assert_eq!(result.to_string(), "1 file(s) generated for partition 3\n  file:///a");
    }
}

use crate::error::LrError;
use crate::streams::datasets::DatasetDef;
use crate::streams::partition::list_partitions;
use crate::util::io::get_gz_reader;
use csv::{ReaderBuilder, StringRecordsIntoIter};
use flate2::read::MultiGzDecoder;
use log::debug;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::marker::PhantomData;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

type GzRecords = StringRecordsIntoIter<BufReader<MultiGzDecoder<File>>>;

/// Lazily reads the records of a list of partition files, one file at a time, in list order.
///
/// Rows may omit trailing optional columns but never carry more than `columns` fields.
pub struct RecordStream<T> {
    dataset: &'static str,
    columns: usize,
    pending: VecDeque<PathBuf>,
    current: Option<GzRecords>,
    record: PhantomData<T>,
}

impl<T: DeserializeOwned> RecordStream<T> {
    pub fn from_paths(dataset: &'static str, columns: usize, paths: Vec<PathBuf>) -> Self {
        RecordStream {
            dataset,
            columns,
            pending: paths.into(),
            current: None,
            record: PhantomData,
        }
    }

    fn open(&self, path: &Path) -> Result<GzRecords, LrError> {
        debug!("Reading '{}' partition '{}'", self.dataset, path.display());
        let reader = get_gz_reader(path)?;
        Ok(ReaderBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quoting(false)
            .flexible(true)
            .from_reader(reader)
            .into_records())
    }

    fn parse(&self, record: csv::Result<csv::StringRecord>) -> Result<T, LrError> {
        let record = record.map_err(|e| LrError::Parse(self.dataset, e.to_string()))?;
        if record.len() > self.columns {
            return Err(LrError::Parse(
                self.dataset,
                format!(
                    "expected at most {} fields, found {} at line {}",
                    self.columns,
                    record.len(),
                    record.position().map_or(0, |position| position.line())
                ),
            ));
        }
        record.deserialize(None).map_err(|e| LrError::Parse(self.dataset, e.to_string()))
    }
}

impl<T: DeserializeOwned> Iterator for RecordStream<T> {
    type Item = Result<T, LrError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(records) = &mut self.current {
                match records.next() {
                    Some(record) => return Some(self.parse(record)),
                    None => self.current = None,
                }
            }
            let path = self.pending.pop_front()?;
            match self.open(&path) {
                Ok(records) => self.current = Some(records),
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Loads every partition of `D` found in `dir`, or only `part_id` when given.
pub fn load<D: DatasetDef>(
    dir: &Path,
    part_id: Option<u32>,
) -> Result<RecordStream<D::Record>, LrError> {
    let paths = list_partitions(dir, D::NAME)?
        .into_iter()
        .filter(|(id, _)| part_id.map_or(true, |part_id| part_id == *id))
        .map(|(_, path)| path)
        .collect::<Vec<_>>();
    if paths.is_empty() {
        return Err(LrError::MissingDataset(D::NAME.to_owned()));
    }
    Ok(RecordStream::from_paths(D::NAME, D::COLUMNS, paths))
}

use crate::error::LrError;
use crate::streams::datasets::DatasetDef;
use crate::streams::partition::{partition_file_name, PartitionLayout};
use crate::streams::Keyed;
use crate::util::io::{finish_gz_writer, get_gz_writer};
use csv::{QuoteStyle, Writer, WriterBuilder};
use flate2::write::GzEncoder;
use log::info;
use serde::Serialize;
use std::fs::File;
use std::io::BufWriter;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

type GzCsvWriter = Writer<GzEncoder<BufWriter<File>>>;

/// One open partition file.
struct PartitionWriter {
    part_id: u32,
    path: PathBuf,
    writer: GzCsvWriter,
    count: usize,
}

impl PartitionWriter {
    fn create(dir: &Path, dataset: &str, part_id: u32) -> Result<Self, LrError> {
        let path = dir.join(partition_file_name(dataset, part_id));
        let writer = WriterBuilder::new()
            .delimiter(b'\t')
            .has_headers(false)
            .quote_style(QuoteStyle::Never)
            .from_writer(get_gz_writer(&path)?);
        Ok(PartitionWriter { part_id, path, writer, count: 0 })
    }

    fn write<T: Serialize>(&mut self, record: &T) -> Result<(), LrError> {
        self.count += 1;
        self.writer
            .serialize(record)
            .map_err(|e| LrError::WriteFile(self.path.display().to_string(), e.to_string()))
    }

    fn finish(self) -> Result<PathBuf, LrError> {
        let path = self.path.display().to_string();
        let gz = self.writer.into_inner().map_err(|e| LrError::WriteFile(path, e.to_string()))?;
        finish_gz_writer(gz, &self.path)?;
        info!("Wrote {} records to '{}'", self.count, self.path.display());
        Ok(self.path)
    }
}

/// Splits an id-ascending record stream into partition files of `D`, opening each file when the
/// first record of its id range shows up. Returns the written files in partition order.
pub fn persist<D, I>(
    records: I,
    dir: &Path,
    layout: PartitionLayout,
) -> Result<Vec<PathBuf>, LrError>
where
    D: DatasetDef,
    I: IntoIterator<Item = Result<D::Record, LrError>>,
{
    let mut written = Vec::new();
    let mut current: Option<PartitionWriter> = None;
    let mut previous = None;
    for record in records {
        let record = record?;
        let key = record.key();
        if let Some(previous) = previous {
            if key < previous {
                return Err(LrError::OutOfOrder(D::NAME, previous, key));
            }
        }
        previous = Some(key);

        let part_id = layout.part_id(key);
        if current.as_ref().map_or(true, |writer| writer.part_id != part_id) {
            if let Some(writer) = current.take() {
                written.push(writer.finish()?);
            }
            current = Some(PartitionWriter::create(dir, D::NAME, part_id)?);
        }
        if let Some(writer) = current.as_mut() {
            writer.write(&record)?;
        }
    }
    if let Some(writer) = current {
        written.push(writer.finish()?);
    }
    Ok(written)
}

/// Writes records of `D` into one partition file, created with the first record.
pub struct LazyPartitionWriter<'a, D> {
    dir: &'a Path,
    part_id: u32,
    current: Option<PartitionWriter>,
    dataset: PhantomData<D>,
}

impl<'a, D: DatasetDef> LazyPartitionWriter<'a, D> {
    pub fn new(dir: &'a Path, part_id: u32) -> Self {
        LazyPartitionWriter { dir, part_id, current: None, dataset: PhantomData }
    }

    pub fn write(&mut self, record: &D::Record) -> Result<(), LrError> {
        if self.current.is_none() {
            self.current = Some(PartitionWriter::create(self.dir, D::NAME, self.part_id)?);
        }
        match self.current.as_mut() {
            Some(writer) => writer.write(record),
            None => Ok(()),
        }
    }

    /// Returns the written file, or `None` if nothing was ever written.
    pub fn finish(self) -> Result<Option<PathBuf>, LrError> {
        self.current.map(PartitionWriter::finish).transpose()
    }
}

/// Writes all records into partition `part_id` of `D`. No file is created for an empty stream.
pub fn write_partition<D, I>(
    records: I,
    dir: &Path,
    part_id: u32,
) -> Result<Option<PathBuf>, LrError>
where
    D: DatasetDef,
    I: IntoIterator<Item = Result<D::Record, LrError>>,
{
    let mut writer = LazyPartitionWriter::<D>::new(dir, part_id);
    for record in records {
        writer.write(&record?)?;
    }
    writer.finish()
}

/// Renders a side output as JSON.
pub fn json_content<T: Serialize>(name: &str, value: &T) -> Result<Vec<u8>, LrError> {
    serde_json::to_vec(value).map_err(|e| LrError::Serialize(name.to_owned(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::streams::datasets::{BadLinkRecord, BadLinks, DatasetDef};
    use crate::streams::partition::PartitionLayout;
    use crate::streams::reader::load;
    use crate::streams::writer::{persist, write_partition};

    fn bad_link(id: u32) -> BadLinkRecord {
        BadLinkRecord::new(id, id + 1, 404)
    }

    #[test]
    fn persist_splits_partitions() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = vec![0, 1, 1, 4, 9, 10].into_iter().map(|id| Ok(bad_link(id)));
        let written = persist::<BadLinks, _>(records, dir.path(), PartitionLayout::new(2, 3))
            .expect("persisted");

        let names = written
            .iter()
            .map(|path| path.file_name().expect("name").to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        assert_eq!(
            names,
            vec!["urlbadlinks.txt.0.gz", "urlbadlinks.txt.1.gz", "urlbadlinks.txt.3.gz"]
        );

        let ids = load::<BadLinks>(dir.path(), Some(3))
            .expect("dataset")
            .map(|r| r.expect("record").id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec![9, 10]);
    }

    #[test]
    fn persist_rejects_unsorted() {
        let dir = tempfile::tempdir().expect("tempdir");
        let records = vec![3, 1].into_iter().map(|id| Ok(bad_link(id)));
        let error = persist::<BadLinks, _>(records, dir.path(), PartitionLayout::default())
            .expect_err("unsorted");
        assert!(error.to_string().contains(BadLinks::NAME));
    }

    #[test]
    fn empty_partition_is_not_written() {
        let dir = tempfile::tempdir().expect("tempdir");
        let written = write_partition::<BadLinks, _>(Vec::new(), dir.path(), 4).expect("written");
        assert!(written.is_none());
        assert_eq!(std::fs::read_dir(dir.path()).expect("dir").count(), 0);
    }
}

//! Sequential binary record files holding the link graph in node id space.

use crate::error::LrError;
use crate::pagerank::grouper::{LinkGroup, VirtualTarget};
use crate::pagerank::node_mapping::NodeMapping;
use crate::util::io::{get_buf_reader, get_buf_writer};
use linkrank_api::{Counter, NodeId, Observer};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

const GRAPH_FILE: &str = "link_graph";
const VIRTUALS_FILE: &str = "virtuals";

/// Graph destinations of one source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphRecord {
    pub source: NodeId,
    pub degree: u32,
    pub destinations: Vec<NodeId>,
}

/// Virtual destinations of one source, with the source's full out-degree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VirtualRecord {
    pub source: NodeId,
    pub out_degree: u32,
    pub destinations: Vec<VirtualTarget>,
}

struct RecordWriter {
    path: PathBuf,
    writer: BufWriter<File>,
    count: u64,
}

impl RecordWriter {
    fn create(path: PathBuf) -> Result<Self, LrError> {
        let writer = get_buf_writer(&path)?;
        Ok(RecordWriter { path, writer, count: 0 })
    }

    fn write<T: Serialize>(&mut self, record: &T) -> Result<(), LrError> {
        self.count += 1;
        bincode::serialize_into(&mut self.writer, record)
            .map_err(|e| LrError::Serialize(self.path.display().to_string(), e.to_string()))
    }

    fn finish(mut self) -> Result<(PathBuf, u64), LrError> {
        self.writer
            .flush()
            .map_err(|e| LrError::WriteFile(self.path.display().to_string(), e.to_string()))?;
        Ok((self.path, self.count))
    }
}

/// Reads back the records of a file written by [`write_graph_files`], one at a time.
pub struct RecordReader<T> {
    path: PathBuf,
    reader: BufReader<File>,
    _record: PhantomData<T>,
}

impl<T: DeserializeOwned> RecordReader<T> {
    pub fn open(path: &Path) -> Result<Self, LrError> {
        let reader = get_buf_reader(path)?;
        Ok(RecordReader { path: path.to_owned(), reader, _record: PhantomData })
    }
}

impl<T: DeserializeOwned> Iterator for RecordReader<T> {
    type Item = Result<T, LrError>;

    fn next(&mut self) -> Option<Self::Item> {
        let path = &self.path;
        let file_path = || path.display().to_string();
        match self.reader.fill_buf() {
            Ok(buffer) if buffer.is_empty() => return None,
            Ok(_) => {}
            Err(e) => return Some(Err(LrError::ReadFile(file_path(), e.to_string()))),
        }
        Some(
            bincode::deserialize_from(&mut self.reader)
                .map_err(|e| LrError::Deserialize(file_path(), e.to_string())),
        )
    }
}

/// The graph file and the number of nodes of its id space.
#[derive(Debug, Clone)]
pub struct FileBackedGraph {
    path: PathBuf,
    node_count: usize,
}

impl FileBackedGraph {
    pub fn new(path: PathBuf, node_count: usize) -> Self {
        FileBackedGraph { path, node_count }
    }

    pub fn node_count(&self) -> usize {
        self.node_count
    }

    /// A fresh sequential pass over the adjacency records.
    pub fn records(&self) -> Result<RecordReader<GraphRecord>, LrError> {
        RecordReader::open(&self.path)
    }
}

#[derive(Debug, Clone)]
pub struct GraphFiles {
    pub graph: FileBackedGraph,
    pub virtuals: PathBuf,
}

/// Writes the graph and virtual files in `dir` from one pass over the grouped links.
pub fn write_graph_files<I>(
    groups: I,
    mapping: &NodeMapping,
    dir: &Path,
    observer: &dyn Observer,
) -> Result<GraphFiles, LrError>
where
    I: Iterator<Item = Result<LinkGroup, LrError>>,
{
    let mut graph = RecordWriter::create(dir.join(GRAPH_FILE))?;
    let mut virtuals = RecordWriter::create(dir.join(VIRTUALS_FILE))?;
    for group in groups {
        let group = group?;
        let source = match mapping.get_internal_id(group.source) {
            Some(source) => source,
            None => {
                observer.on_counter(Counter::RecordsSkipped, 1);
                continue;
            }
        };
        if !group.normals.is_empty() {
            // Normal destinations are mapped by construction.
            let destinations = group
                .normals
                .iter()
                .filter_map(|id| mapping.get_internal_id(*id))
                .collect::<Vec<_>>();
            graph.write(&GraphRecord { source, degree: destinations.len() as u32, destinations })?;
        }
        if !group.virtuals.is_empty() {
            virtuals.write(&VirtualRecord {
                source,
                out_degree: group.out_degree,
                destinations: group.virtuals,
            })?;
        }
    }
    let (graph_path, graph_count) = graph.finish()?;
    let (virtuals_path, virtuals_count) = virtuals.finish()?;
    observer.on_counter(Counter::GraphRecordsWritten, graph_count);
    observer.on_counter(Counter::VirtualRecordsWritten, virtuals_count);
    Ok(GraphFiles {
        graph: FileBackedGraph::new(graph_path, mapping.len()),
        virtuals: virtuals_path,
    })
}

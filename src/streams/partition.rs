use crate::error::LrError;
use linkrank_api::UrlId;
use std::path::{Path, PathBuf};

pub const FIRST_PART_ID_SIZE: UrlId = 500_000;
pub const PART_ID_SIZE: UrlId = 500_000;

const FILE_INFIX: &str = ".txt.";
const FILE_SUFFIX: &str = ".gz";

/// Id ranges covered by each partition: `[0, first_part_size)` for partition 0, then
/// `part_size` ids per partition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, new)]
pub struct PartitionLayout {
    pub first_part_size: UrlId,
    pub part_size: UrlId,
}

impl Default for PartitionLayout {
    fn default() -> Self {
        PartitionLayout { first_part_size: FIRST_PART_ID_SIZE, part_size: PART_ID_SIZE }
    }
}

impl PartitionLayout {
    pub fn part_id(&self, id: UrlId) -> u32 {
        if id < self.first_part_size {
            0
        } else {
            1 + (id - self.first_part_size) / self.part_size.max(1)
        }
    }
}

pub fn partition_file_name(dataset: &str, part_id: u32) -> String {
    format!("{}{}{}{}", dataset, FILE_INFIX, part_id, FILE_SUFFIX)
}

/// Extracts `n` from a path whose file name is `<dataset>.txt.<n>.gz`.
pub fn partition_id_from_filename(file_path: &str) -> Result<u32, LrError> {
    let malformed = || LrError::MalformedPartitionId(file_path.to_owned());
    let file_name =
        Path::new(file_path).file_name().and_then(|n| n.to_str()).ok_or_else(malformed)?;
    let stem = file_name.strip_suffix(FILE_SUFFIX).ok_or_else(malformed)?;
    let (dataset, part_id) = stem.rsplit_once('.').ok_or_else(malformed)?;
    let digits = !part_id.is_empty() && part_id.bytes().all(|b| b.is_ascii_digit());
    if !dataset.ends_with(".txt") || !digits {
        return Err(malformed());
    }
    part_id.parse().map_err(|_| malformed())
}

/// Lists the partitions of `dataset` found in `dir`, in ascending partition order.
pub fn list_partitions(dir: &Path, dataset: &str) -> Result<Vec<(u32, PathBuf)>, LrError> {
    let prefix = format!("{}{}", dataset, FILE_INFIX);
    let entries = std::fs::read_dir(dir)
        .map_err(|e| LrError::ReadFile(dir.display().to_string(), e.to_string()))?;
    let mut partitions = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|e| LrError::ReadFile(dir.display().to_string(), e.to_string()))?;
        let file_name = entry.file_name().to_string_lossy().into_owned();
        if file_name.starts_with(&prefix) && file_name.ends_with(FILE_SUFFIX) {
            partitions.push((partition_id_from_filename(&file_name)?, entry.path()));
        }
    }
    partitions.sort();
    Ok(partitions)
}

use crate::error::LrError;
use crate::streams::partition::list_partitions;
use crate::util::io::write_content;
use log::debug;
use std::path::{Path, PathBuf};

const FILE_SCHEME: &str = "file://";

/// Remote storage holding the datasets of one crawl. Tasks fetch their inputs into a local
/// temporary directory and push what they generate back under the crawl uri.
pub trait ObjectStore {
    /// Makes the partitions of `dataset` (all of them, or only `part_id`) available in `tmp_dir`.
    /// A dataset without partitions is not an error: loading it reports `MissingDataset`.
    fn fetch_dataset(
        &self,
        uri: &str,
        dataset: &str,
        part_id: Option<u32>,
        tmp_dir: &Path,
        force_fetch: bool,
    ) -> Result<(), LrError>;

    /// Copies the file `name` into `tmp_dir` and returns its local path.
    fn fetch_file(
        &self,
        uri: &str,
        name: &str,
        tmp_dir: &Path,
        force_fetch: bool,
    ) -> Result<PathBuf, LrError>;

    /// Pushes a local file under `uri`, keeping its file name. Returns the remote uri.
    fn push_file(&self, uri: &str, file_path: &Path) -> Result<String, LrError>;

    /// Stores `content` as `name` under `uri`. Returns the remote uri.
    fn push_content(&self, uri: &str, name: &str, content: &[u8]) -> Result<String, LrError>;
}

/// Joins a file name onto a uri.
pub fn join_uri(uri: &str, name: &str) -> String {
    format!("{}/{}", uri.trim_end_matches('/'), name)
}

/// Maps `file://` uris, or plain paths, onto the local file system.
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalObjectStore;

impl LocalObjectStore {
    fn local_path(uri: &str) -> PathBuf {
        PathBuf::from(uri.strip_prefix(FILE_SCHEME).unwrap_or(uri))
    }

    fn copy(source: &Path, destination: &Path, force_fetch: bool) -> Result<(), LrError> {
        if source == destination || (destination.exists() && !force_fetch) {
            return Ok(());
        }
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LrError::CreateFile(parent.display().to_string(), e.to_string())
            })?;
        }
        debug!("Copying '{}' to '{}'", source.display(), destination.display());
        std::fs::copy(source, destination).map_err(|e| {
            LrError::Store(format!(
                "Could not copy '{}' to '{}': {}",
                source.display(),
                destination.display(),
                e
            ))
        })?;
        Ok(())
    }
}

impl ObjectStore for LocalObjectStore {
    fn fetch_dataset(
        &self,
        uri: &str,
        dataset: &str,
        part_id: Option<u32>,
        tmp_dir: &Path,
        force_fetch: bool,
    ) -> Result<(), LrError> {
        let remote_dir = Self::local_path(uri);
        for (id, path) in list_partitions(&remote_dir, dataset)? {
            if part_id.map_or(false, |part_id| part_id != id) {
                continue;
            }
            if let Some(name) = path.file_name() {
                Self::copy(&path, &tmp_dir.join(name), force_fetch)?;
            }
        }
        Ok(())
    }

    fn fetch_file(
        &self,
        uri: &str,
        name: &str,
        tmp_dir: &Path,
        force_fetch: bool,
    ) -> Result<PathBuf, LrError> {
        let source = Self::local_path(uri).join(name);
        if !source.is_file() {
            return Err(LrError::Store(format!("No file '{}' under '{}'", name, uri)));
        }
        let destination = tmp_dir.join(name);
        Self::copy(&source, &destination, force_fetch)?;
        Ok(destination)
    }

    fn push_file(&self, uri: &str, file_path: &Path) -> Result<String, LrError> {
        let name = file_path
            .file_name()
            .ok_or_else(|| {
                LrError::Store(format!("Cannot push '{}': not a file", file_path.display()))
            })?
            .to_string_lossy()
            .into_owned();
        Self::copy(file_path, &Self::local_path(uri).join(&name), true)?;
        Ok(join_uri(uri, &name))
    }

    fn push_content(&self, uri: &str, name: &str, content: &[u8]) -> Result<String, LrError> {
        let destination = Self::local_path(uri).join(name);
        if let Some(parent) = destination.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                LrError::CreateFile(parent.display().to_string(), e.to_string())
            })?;
        }
        write_content(&destination, content)?;
        Ok(join_uri(uri, name))
    }
}

#[cfg(test)]
mod tests {
    use crate::tasks::store::{join_uri, LocalObjectStore, ObjectStore};

    #[test]
    fn push_and_fetch() {
        let remote = tempfile::tempdir().expect("remote");
        let local = tempfile::tempdir().expect("local");
        let uri = format!("file://{}/", remote.path().display());
        let store = LocalObjectStore;

        let pushed = store.push_content(&uri, "crawl_info.json", b"{}").expect("pushed");
        assert_eq!(pushed, join_uri(&uri, "crawl_info.json"));
        assert!(pushed.ends_with("/crawl_info.json") && !pushed.contains("//crawl"));

        let fetched = store.fetch_file(&uri, "crawl_info.json", local.path(), false).expect("file");
        assert_eq!(std::fs::read(fetched).expect("read"), b"{}");
        assert!(store.fetch_file(&uri, "missing.json", local.path(), false).is_err());
    }

    #[test]
    fn fetch_single_partition() {
        let remote = tempfile::tempdir().expect("remote");
        let local = tempfile::tempdir().expect("local");
        for name in &["urllinks.txt.0.gz", "urllinks.txt.1.gz", "urlinfos.txt.1.gz"] {
            std::fs::write(remote.path().join(name), b"").expect("write");
        }
        let uri = remote.path().display().to_string();
        LocalObjectStore
            .fetch_dataset(&uri, "urllinks", Some(1), local.path(), false)
            .expect("fetched");

        let mut names = std::fs::read_dir(local.path())
            .expect("dir")
            .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
            .collect::<Vec<_>>();
        names.sort();
        assert_eq!(names, vec!["urllinks.txt.1.gz"]);
    }
}

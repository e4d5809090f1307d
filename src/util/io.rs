use crate::error::LrError;
use flate2::read::MultiGzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

pub fn get_buf_reader(file_path: &Path) -> Result<BufReader<File>, LrError> {
    Ok(BufReader::new(
        File::open(file_path)
            .map_err(|e| LrError::ReadFile(file_path.display().to_string(), e.to_string()))?,
    ))
}

/// Opens a gzip file, accepting concatenated gzip members.
pub fn get_gz_reader(file_path: &Path) -> Result<BufReader<MultiGzDecoder<File>>, LrError> {
    let file = File::open(file_path)
        .map_err(|e| LrError::ReadFile(file_path.display().to_string(), e.to_string()))?;
    Ok(BufReader::new(MultiGzDecoder::new(file)))
}

pub fn get_buf_writer(file_path: &Path) -> Result<BufWriter<File>, LrError> {
    Ok(BufWriter::new(
        File::create(file_path)
            .map_err(|e| LrError::CreateFile(file_path.display().to_string(), e.to_string()))?,
    ))
}

pub fn get_gz_writer(file_path: &Path) -> Result<GzEncoder<BufWriter<File>>, LrError> {
    Ok(GzEncoder::new(get_buf_writer(file_path)?, Compression::default()))
}

/// Flushes a gzip writer and its underlying file.
pub fn finish_gz_writer(
    writer: GzEncoder<BufWriter<File>>,
    file_path: &Path,
) -> Result<(), LrError> {
    let write_error =
        |e: std::io::Error| LrError::WriteFile(file_path.display().to_string(), e.to_string());
    let mut inner = writer.finish().map_err(write_error)?;
    inner.flush().map_err(write_error)
}

pub fn write_content(file_path: &Path, content: &[u8]) -> Result<(), LrError> {
    let mut writer = get_buf_writer(file_path)?;
    writer
        .write_all(content)
        .and_then(|_| writer.flush())
        .map_err(|e| LrError::WriteFile(file_path.display().to_string(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use crate::util::io::{finish_gz_writer, get_gz_reader, get_gz_writer};
    use std::io::{Read, Write};

    #[test]
    fn gzip_files() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("lines.txt.0.gz");
        let mut writer = get_gz_writer(&path).expect("writer");
        writer.write_all(b"1\ta\n2\tb\n").expect("write");
        finish_gz_writer(writer, &path).expect("finish");

        let mut content = String::new();
        get_gz_reader(&path).expect("reader").read_to_string(&mut content).expect("read");
        assert_eq!(content, "1\ta\n2\tb\n");
    }

    #[test]
    fn missing_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let error = get_gz_reader(&dir.path().join("missing.gz")).expect_err("should fail");
        assert!(error.to_string().starts_with("[IOError] Could not open file"));
    }
}

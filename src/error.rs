use linkrank_api::UrlId;

#[derive(Debug)]
pub enum LrError {
    Generic(String),
    ReadFile(String, String),
    CreateFile(String, String),
    WriteFile(String, String),
    MalformedPartitionId(String),
    UnknownDispositionLabel(String),
    UnknownDispositionBits(u32),
    UnknownLinkType(String),
    OutOfOrder(&'static str, UrlId, UrlId),
    Parse(&'static str, String),
    Serialize(String, String),
    Deserialize(String, String),
    MissingDataset(String),
    Config(String),
    Store(String),
}

impl std::fmt::Display for LrError {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            LrError::Generic(msg) => write!(f, "[LrError] {}", msg)?,
            LrError::ReadFile(file_path, e) => {
                write!(f, "[IOError] Could not open file '{}' for reading: {}", file_path, e)?;
            }
            LrError::CreateFile(file_path, e) => {
                write!(f, "[IOError] Could not create file '{}' for writing: {}", file_path, e)?;
            }
            LrError::WriteFile(file_path, e) => {
                write!(f, "[IOError] Could not write to '{}': {}", file_path, e)?;
            }
            LrError::MalformedPartitionId(file_name) => write!(
                f,
                "[PartitionError] File name '{}' does not end with a valid partition id",
                file_name
            )?,
            LrError::UnknownDispositionLabel(label) => {
                write!(f, "[DispositionError] Unknown disposition label '{}'", label)?;
            }
            LrError::UnknownDispositionBits(bits) => {
                write!(f, "[DispositionError] Unknown disposition bits in mask {:#b}", bits)?;
            }
            LrError::UnknownLinkType(link_type) => {
                write!(f, "[ParsingError] Unknown link type '{}'", link_type)?;
            }
            LrError::OutOfOrder(dataset, previous, found) => write!(
                f,
                "[StreamError] Dataset '{}' is not sorted: id {} found after id {}",
                dataset, found, previous
            )?,
            LrError::Parse(dataset, message) => {
                write!(f, "[ParsingError] Could not parse '{}' record: {}", dataset, message)?;
            }
            LrError::Serialize(name, e) => {
                write!(f, "[SerdeError] Could not serialize '{}': {}", name, e)?;
            }
            LrError::Deserialize(name, e) => {
                write!(f, "[SerdeError] Could not deserialize '{}': {}", name, e)?;
            }
            LrError::MissingDataset(name) => {
                write!(f, "[StoreError] No partition found for dataset '{}'", name)?;
            }
            LrError::Config(message) => write!(f, "[ConfigError] {}", message)?,
            LrError::Store(message) => write!(f, "[StoreError] {}", message)?,
        }
        Ok(())
    }
}

impl std::error::Error for LrError {}

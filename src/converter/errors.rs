use std::fmt;

/// Error types for the knowledge-base conversion pipeline
#[derive(Debug)]
pub enum ConvertError {
    /// Input archive related errors
    Archive(ArchiveError),
    /// Network fetch related errors
    Fetch(FetchError),
    /// Local filesystem errors
    Io(std::io::Error),
    /// Invalid invocation (no file and no URL, bad arguments)
    Input(String),
}

/// Errors raised while reading the export container or writing the result
#[derive(Debug)]
pub enum ArchiveError {
    /// No top-level directory in the container holds the metadata file
    MissingMetadata(String),
    /// Metadata was found but its table of contents is empty
    EmptyToc,
    /// Metadata JSON or the nested TOC YAML could not be decoded
    MetadataParse(String),
    /// A TOC entry points at a document payload that is not in the container
    MissingDocument(String),
    /// The container itself could not be unpacked
    ReadFailed(std::io::Error),
    /// The result archive could not be written
    WriteFailed(String),
}

/// Errors raised while fetching a hosted page or an embedded image
#[derive(Debug)]
pub enum FetchError {
    RequestFailed(String),
    BadStatus(String, u16),
    InvalidUrl(String),
    /// The fetched page carries no recognizable embedded document state
    StateExtraction(String),
}

impl fmt::Display for ConvertError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConvertError::Archive(e) => write!(f, "Archive error: {}", e),
            ConvertError::Fetch(e) => write!(f, "Fetch error: {}", e),
            ConvertError::Io(e) => write!(f, "I/O error: {}", e),
            ConvertError::Input(msg) => write!(f, "Input error: {}", msg),
        }
    }
}

impl fmt::Display for ArchiveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArchiveError::MissingMetadata(name) => {
                write!(f, "metadata file '{}' not found in archive", name)
            }
            ArchiveError::EmptyToc => write!(f, "archive table of contents is empty"),
            ArchiveError::MetadataParse(msg) => write!(f, "failed to parse metadata: {}", msg),
            ArchiveError::MissingDocument(path) => {
                write!(f, "document payload missing from archive: {}", path)
            }
            ArchiveError::ReadFailed(e) => write!(f, "failed to read archive: {}", e),
            ArchiveError::WriteFailed(msg) => write!(f, "failed to write archive: {}", msg),
        }
    }
}

impl fmt::Display for FetchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FetchError::RequestFailed(msg) => write!(f, "HTTP request failed: {}", msg),
            FetchError::BadStatus(url, status) => {
                write!(f, "unexpected status {} for: {}", status, url)
            }
            FetchError::InvalidUrl(url) => write!(f, "invalid URL: {}", url),
            FetchError::StateExtraction(msg) => {
                write!(f, "no embedded document state found: {}", msg)
            }
        }
    }
}

impl std::error::Error for ConvertError {}
impl std::error::Error for ArchiveError {}
impl std::error::Error for FetchError {}

impl From<ArchiveError> for ConvertError {
    fn from(err: ArchiveError) -> Self {
        ConvertError::Archive(err)
    }
}

impl From<FetchError> for ConvertError {
    fn from(err: FetchError) -> Self {
        ConvertError::Fetch(err)
    }
}

impl From<std::io::Error> for ConvertError {
    fn from(err: std::io::Error) -> Self {
        ConvertError::Io(err)
    }
}

impl From<url::ParseError> for ConvertError {
    fn from(err: url::ParseError) -> Self {
        ConvertError::Fetch(FetchError::InvalidUrl(err.to_string()))
    }
}

impl From<serde_json::Error> for ConvertError {
    fn from(err: serde_json::Error) -> Self {
        ConvertError::Archive(ArchiveError::MetadataParse(err.to_string()))
    }
}

impl From<serde_yaml::Error> for ConvertError {
    fn from(err: serde_yaml::Error) -> Self {
        ConvertError::Archive(ArchiveError::MetadataParse(err.to_string()))
    }
}

impl From<zip::result::ZipError> for ConvertError {
    fn from(err: zip::result::ZipError) -> Self {
        ConvertError::Archive(ArchiveError::WriteFailed(err.to_string()))
    }
}

impl From<reqwest::Error> for ConvertError {
    fn from(err: reqwest::Error) -> Self {
        ConvertError::Fetch(FetchError::RequestFailed(err.to_string()))
    }
}

/// Result type alias for conversion operations
pub type ConvertResult<T> = Result<T, ConvertError>;

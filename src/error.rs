use std::path::PathBuf;

use thiserror::Error;

/// The only failure the extraction core can report: the text is not XML.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("malformed XML at {line}:{column}: {message}")]
pub struct MalformedXmlError {
    pub message: String,
    pub line: u32,
    pub column: u32,
}

impl From<roxmltree::Error> for MalformedXmlError {
    fn from(err: roxmltree::Error) -> Self {
        let pos = err.pos();
        Self {
            message: err.to_string(),
            line: pos.row,
            column: pos.col,
        }
    }
}

#[derive(Debug, Error)]
pub enum SerializeError {
    #[error("xml writer: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("xml writer produced invalid utf-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to open archive {path}: {source}")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },
    #[error("unsupported input: {0}")]
    UnsupportedFormat(PathBuf),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid pattern for {field}: {pattern}")]
    InvalidPattern { field: String, pattern: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AlternateExtractionError {
    #[error("alternate extractor unavailable: {0}")]
    Unavailable(String),
    #[error("alternate extractor returned an invalid shape: {0}")]
    InvalidShape(String),
}

//! Error types for packaging

use std::path::PathBuf;
use tcr_model::ModelError;

/// Packaging failure
#[derive(Debug, thiserror::Error)]
pub enum PackageError {
    /// The record failed its structural checks
    #[error("record is not packageable: {0}")]
    InvalidRecord(#[from] ModelError),

    /// Stored sketch is not valid base64
    #[error("sketch could not be decoded: {0}")]
    SketchEncoding(String),

    /// Record or manifest serialization failed
    #[error("serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Zip encoding failed
    #[error("archive could not be written: {0}")]
    Archive(String),

    /// IO error while writing the bundle
    #[error("io error writing {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl PackageError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

use crate::validation::ValidationError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuoteDeskError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The document exists on disk but does not parse as the expected JSON.
    #[error("Corrupt data in {}: {source}", path.display())]
    CorruptData {
        path: PathBuf,
        source: serde_json::Error,
    },

    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("Could not create snapshot at {}: {source}", path.display())]
    SnapshotFailed {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Store error: {0}")]
    Store(String),

    #[error("Api Error: {0}")]
    Api(String),
}

pub type Result<T> = std::result::Result<T, QuoteDeskError>;

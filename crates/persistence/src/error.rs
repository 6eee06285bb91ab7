//! Persistence layer errors, with the path that failed.

use std::path::PathBuf;

use lead_triage_core::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("malformed json in {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("{0}")]
    NotFound(String),
}

impl PersistenceError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PersistenceError::Io {
            path: path.into(),
            source,
        }
    }

    pub fn json(path: impl Into<PathBuf>, source: serde_json::Error) -> Self {
        PersistenceError::Json {
            path: path.into(),
            source,
        }
    }
}

/// Flattens into the store error the core traits speak; the path context
/// survives inside the message.
impl From<PersistenceError> for StoreError {
    fn from(err: PersistenceError) -> Self {
        match &err {
            PersistenceError::Io { .. } => StoreError::Io(err.to_string()),
            PersistenceError::Json { .. } => StoreError::Serde(err.to_string()),
            PersistenceError::NotFound(_) => StoreError::NotFound(err.to_string()),
        }
    }
}

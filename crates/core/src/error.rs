//! Shared error type for roster/counter store implementations.

use thiserror::Error;

/// Errors surfaced by `RosterStore` / `CounterStore` implementations.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(String),

    #[error("Serialization error: {0}")]
    Serde(String),

    #[error("Not found: {0}")]
    NotFound(String),
}

impl From<std::io::Error> for StoreError {
    fn from(err: std::io::Error) -> Self {
        StoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Serde(err.to_string())
    }
}

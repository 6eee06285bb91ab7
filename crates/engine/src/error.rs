//! Engine error types.

use thiserror::Error;

/// Errors surfaced by the session-level engine APIs.
///
/// `handle_turn` itself never fails: extraction, scoring and routing
/// degrade to in-band replies. Only the lookup-style APIs (snapshot,
/// reset, follow-up preview) can miss.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("unknown session: {0}")]
    UnknownSession(String),
}

//! File-backed persistence for the triage service.
//!
//! Small stores, each behind a trait from the core crate:
//! - agent roster: a JSON array maintained by operations staff;
//! - assignment counters: one JSON file, reset daily, rewritten
//!   atomically on every recorded assignment;
//! - audit events: append-only JSONL files, one per stream;
//! - neighborhood directory: a JSON name list read once at startup.
//!
//! Nothing here knows about sessions or scoring; the engine hands fully
//! formed records down and the stores only move bytes.

pub mod counters;
pub mod directory;
pub mod error;
pub mod events;
pub mod roster;

pub use counters::FileCounterStore;
pub use directory::FileNeighborhoodDirectory;
pub use error::PersistenceError;
pub use events::JsonlEventLog;
pub use roster::FileRosterStore;

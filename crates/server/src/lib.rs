//! Lead Triage Server
//!
//! HTTP surface over the deterministic triage engine: the turn endpoint,
//! session inspection, follow-up preview/claim, roster administration and
//! the health/metrics plumbing.

pub mod http;
pub mod metrics;
pub mod state;

pub use http::create_router;
pub use metrics::{init_metrics, metrics_handler, record_turn_latency};
pub use state::AppState;

//! Deterministic lead-to-agent routing.
//!
//! No model calls anywhere in this crate: agents are ranked by explainable
//! rule scores, capacity is enforced against the daily counters, and every
//! decision lands in the routing audit stream.

pub mod error;
pub mod router;
pub mod score;

pub use error::RoutingError;
pub use router::AgentRouter;
pub use score::{score_agent, LeadProfile};

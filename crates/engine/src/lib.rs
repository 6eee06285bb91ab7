//! Deterministic Lead Triage Engine
//!
//! Every decision in this crate is a pure function of session state and
//! configuration: no model calls, no randomness, no clocks inside the
//! decision logic (timestamps only stamp records). The crate owns:
//! - Session state, the field normalizer and the confirmed-field conflict rule
//! - The question selector and the quality gate that decides handoff readiness
//! - Profile quality scoring (grades) and lead temperature scoring (SLA)
//! - Turn orchestration wiring extraction, routing and the audit streams
//! - Follow-up nudge selection for idle sessions
//!
//! The HTTP surface lives in the server crate; collaborators (extractor,
//! roster, counters, event sink) are injected through the core traits.

pub mod error;
pub mod followup;
pub mod gate;
pub mod normalize;
pub mod quality;
pub mod questions;
pub mod scoring;
pub mod session;
pub mod sla;
pub mod summary;
pub mod turn;

pub use error::EngineError;
pub use followup::{followup_for, FollowupMessage};
pub use gate::{identify_gaps, may_handoff, next_gate_question, QualityGaps};
pub use normalize::normalize_value;
pub use quality::score_quality;
pub use questions::next_topic;
pub use scoring::score_lead;
pub use session::{SessionState, SessionStore};
pub use sla::{sla_for, HotLeadEvent};
pub use summary::{field_label_pt, render_summary_text, TriageSummary};
pub use turn::{HandoffInfo, TriageEngine, TurnOutcome};

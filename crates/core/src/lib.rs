//! Core Types for the Lead Triage Engine
//!
//! Shared vocabulary consumed by every other crate:
//! - Criteria fields: closed field identifiers, typed values, provenance
//! - Lead domain enums: operation, timeline, micro-location, temperature
//! - Quality report types (score, grade, typed adjustment reasons)
//! - Roster types: agents, assignment counters, routing results
//! - Collaborator traits: extraction, neighborhood directory, stores

pub mod error;
pub mod fields;
pub mod lead;
pub mod quality;
pub mod roster;
pub mod traits;

pub use error::StoreError;
pub use fields::{
    AskTopic, CriteriaField, FieldConflict, FieldId, FieldStatus, FieldUpdate, FieldValue,
    UpdateSource,
};
pub use lead::{
    format_brl, EngagementStage, HandoffReason, LeadIdentity, LeadScore, MicroLocation, Operation,
    SlaType, Temperature, Timeline, UrgencyLevel,
};
pub use quality::{Grade, QualityReason, QualityReport};
pub use roster::{Agent, AgentTier, AssignmentRecord, RoutingResult, RoutingStrategy};
pub use traits::{
    CounterStore, CriteriaExtractor, EventSink, EventStream, NeighborhoodDirectory, NullEventSink,
    RosterStore,
};

//! Domain Configuration
//!
//! Triage-domain knobs as opposed to runtime settings: scoring weights,
//! grade and temperature cutoffs, routing weights, the Portuguese question
//! bank and reply templates, and the extraction lexicons. Everything has
//! canonical defaults in code; a YAML file only overrides what it names.

mod master;
mod questions;
mod replies;
mod thresholds;
mod vocabulary;

pub use master::DomainConfig;
pub use questions::{stable_variant_index, FollowupConfig, FollowupNudge, QuestionBank, QuestionVariants};
pub use replies::ReplyTemplates;
pub use thresholds::{GateConfig, QualityThresholds, RoutingThresholds, ScoreWeights, SlaThresholds};
pub use vocabulary::{
    CityAlias, HandoffKeywords, MicroLocationPhrases, PhraseAlias, PropertyTypeEntry,
    TimelinePhrases, VocabularyConfig,
};

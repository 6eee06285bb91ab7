//! Configuration management for the lead triage engine
//!
//! Supports loading configuration from:
//! - YAML files (config/default.yaml + config/{env}.yaml)
//! - Environment variables (LEAD_TRIAGE__ prefix, "__" separator)
//!
//! Domain configuration (scoring thresholds, question variants, keyword
//! lexicons) lives in a separate YAML pointed to by
//! `settings.domain_config_path`; every value has a canonical default in
//! code so the engine runs with no files present at all.

pub mod domain;
pub mod settings;

pub use domain::{
    DomainConfig, FollowupConfig, GateConfig, HandoffKeywords, QualityThresholds, QuestionBank,
    ReplyTemplates, RoutingThresholds, ScoreWeights, SlaThresholds, VocabularyConfig,
};
pub use settings::{
    load_settings, DataConfig, EngineConfig, ObservabilityConfig, RuntimeEnvironment,
    ServerConfig, Settings,
};

use thiserror::Error;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: String, message: String },

    #[error("Environment error: {0}")]
    Environment(String),
}

impl From<config::ConfigError> for ConfigError {
    fn from(err: config::ConfigError) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}

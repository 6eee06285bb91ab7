//! Master Domain Configuration
//!
//! Aggregates every domain section (thresholds, question bank, replies,
//! vocabulary, handoff keywords) into one struct loadable from a single
//! YAML file. Each section falls back to its canonical in-code defaults,
//! so an empty or absent file yields a fully working configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};

use super::questions::{FollowupConfig, QuestionBank};
use super::replies::ReplyTemplates;
use super::thresholds::{GateConfig, QualityThresholds, RoutingThresholds, SlaThresholds};
use super::vocabulary::{HandoffKeywords, VocabularyConfig};
use crate::ConfigError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainConfig {
    #[serde(default)]
    pub quality: QualityThresholds,
    #[serde(default)]
    pub sla: SlaThresholds,
    #[serde(default)]
    pub routing: RoutingThresholds,
    #[serde(default)]
    pub gate: GateConfig,
    #[serde(default)]
    pub questions: QuestionBank,
    #[serde(default)]
    pub followup: FollowupConfig,
    #[serde(default)]
    pub replies: ReplyTemplates,
    #[serde(default)]
    pub vocabulary: VocabularyConfig,
    #[serde(default)]
    pub handoff: HandoffKeywords,
}

impl DomainConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.display().to_string()));
        }
        let content = std::fs::read_to_string(path).map_err(|e| {
            ConfigError::ParseError(format!("failed to read domain config: {}", e))
        })?;
        let config: DomainConfig = serde_yaml::from_str(&content).map_err(|e| {
            ConfigError::ParseError(format!("failed to parse domain config: {}", e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load from an optional path; any problem falls back to defaults so a
    /// missing or broken file never stops startup.
    pub fn load_or_default(path: Option<&str>) -> Self {
        match path {
            Some(path) => match Self::load(path) {
                Ok(config) => {
                    tracing::info!(path = %path, "loaded domain config");
                    config
                }
                Err(e) => {
                    tracing::warn!(path = %path, error = %e, "domain config unusable, using defaults");
                    Self::default()
                }
            },
            None => Self::default(),
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.sla.warm > self.sla.hot {
            return Err(ConfigError::InvalidValue {
                field: "sla.warm".to_string(),
                message: "warm cutoff must not exceed hot cutoff".to_string(),
            });
        }
        if self.quality.grade_c > self.quality.grade_b || self.quality.grade_b > self.quality.grade_a
        {
            return Err(ConfigError::InvalidValue {
                field: "quality.grades".to_string(),
                message: "grade cutoffs must be ordered c <= b <= a".to_string(),
            });
        }
        if self.gate.max_gate_turns == 0 {
            return Err(ConfigError::InvalidValue {
                field: "gate.max_gate_turns".to_string(),
                message: "must be at least 1".to_string(),
            });
        }
        if self.vocabulary.default_city.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "vocabulary.default_city".to_string(),
                message: "default city cannot be empty".to_string(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write as _;

    #[test]
    fn default_config_is_valid() {
        let config = DomainConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.sla.hot, 80);
        assert_eq!(config.gate.min_score, 70);
        assert_eq!(config.vocabulary.default_city, "João Pessoa");
    }

    #[test]
    fn load_reads_partial_yaml_over_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domain.yaml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "sla:\n  hot: 85\nrouting:\n  neighborhood_match: 40\n"
        )
        .unwrap();

        let config = DomainConfig::load(&path).unwrap();
        assert_eq!(config.sla.hot, 85);
        assert_eq!(config.sla.warm, 50);
        assert_eq!(config.routing.neighborhood_match, 40);
        assert_eq!(config.quality.grade_a, 85);
    }

    #[test]
    fn load_rejects_missing_file() {
        let err = DomainConfig::load("/nonexistent/domain.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound(_)));
    }

    #[test]
    fn load_rejects_inverted_cutoffs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("domain.yaml");
        std::fs::write(&path, "sla:\n  hot: 40\n  warm: 60\n").unwrap();

        let err = DomainConfig::load(&path).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { .. }));
    }

    #[test]
    fn load_or_default_survives_bad_path() {
        let config = DomainConfig::load_or_default(Some("/nonexistent/domain.yaml"));
        assert_eq!(config.sla.hot, 80);
    }
}

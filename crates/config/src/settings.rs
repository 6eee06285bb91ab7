//! Application Settings
//!
//! Layered configuration:
//! 1. Built-in defaults (this file)
//! 2. config/default.yaml
//! 3. config/{environment}.yaml
//! 4. Environment variables with the LEAD_TRIAGE__ prefix
//!
//! Example: `LEAD_TRIAGE__SERVER__PORT=9090` overrides `server.port`.

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Runtime environment the process was started for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeEnvironment {
    #[default]
    Development,
    Staging,
    Production,
}

impl RuntimeEnvironment {
    pub fn is_production(&self) -> bool {
        matches!(self, RuntimeEnvironment::Production)
    }
}

impl std::fmt::Display for RuntimeEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RuntimeEnvironment::Development => write!(f, "development"),
            RuntimeEnvironment::Staging => write!(f, "staging"),
            RuntimeEnvironment::Production => write!(f, "production"),
        }
    }
}

/// Top-level application settings
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub environment: RuntimeEnvironment,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub data: DataConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Port to bind on (all interfaces)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Enable CORS origin checks
    #[serde(default = "default_cors_enabled")]
    pub cors_enabled: bool,
    /// Allowed CORS origins; empty list falls back to localhost
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            cors_enabled: default_cors_enabled(),
            cors_origins: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_cors_enabled() -> bool {
    true
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// File-backed data store locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Roster of agents available for assignment
    #[serde(default = "default_roster_path")]
    pub roster_path: String,
    /// Seed roster shipped with the repo, used when roster_path is absent
    #[serde(default = "default_roster_example_path")]
    pub roster_example_path: String,
    /// Daily assignment counters (atomically rewritten)
    #[serde(default = "default_counters_path")]
    pub counters_path: String,
    /// Completed lead records, one JSON object per line
    #[serde(default = "default_leads_log_path")]
    pub leads_log_path: String,
    /// Routing decision audit log, one JSON object per line
    #[serde(default = "default_routing_log_path")]
    pub routing_log_path: String,
    /// Hot lead notification events, one JSON object per line
    #[serde(default = "default_hot_events_path")]
    pub hot_events_path: String,
    /// Follow-up send history, one JSON object per line
    #[serde(default = "default_followups_path")]
    pub followups_path: String,
    /// Known-neighborhood list handed to the extractor
    #[serde(default = "default_neighborhoods_path")]
    pub neighborhoods_path: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            roster_path: default_roster_path(),
            roster_example_path: default_roster_example_path(),
            counters_path: default_counters_path(),
            leads_log_path: default_leads_log_path(),
            routing_log_path: default_routing_log_path(),
            hot_events_path: default_hot_events_path(),
            followups_path: default_followups_path(),
            neighborhoods_path: default_neighborhoods_path(),
        }
    }
}

fn default_roster_path() -> String {
    "data/agents.json".to_string()
}

fn default_roster_example_path() -> String {
    "data/agents.example.json".to_string()
}

fn default_counters_path() -> String {
    "data/assignment_stats.json".to_string()
}

fn default_leads_log_path() -> String {
    "data/leads.jsonl".to_string()
}

fn default_routing_log_path() -> String {
    "data/routing_decisions.jsonl".to_string()
}

fn default_hot_events_path() -> String {
    "data/hot_leads.jsonl".to_string()
}

fn default_followups_path() -> String {
    "data/followups.jsonl".to_string()
}

fn default_neighborhoods_path() -> String {
    "data/neighborhoods.json".to_string()
}

/// Engine behavior knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Optional domain YAML overriding the built-in scoring tables,
    /// question variants and keyword lexicons
    #[serde(default)]
    pub domain_config_path: Option<String>,
    /// Show the assigned agent's contact handle in user-facing replies
    #[serde(default)]
    pub expose_agent_contact: bool,
    /// Hard cap on follow-up nudges per session
    #[serde(default = "default_max_followups")]
    pub max_followups: u32,
    /// Idle hours before a warm lead is due a follow-up
    #[serde(default = "default_warm_idle_hours")]
    pub warm_idle_hours: u32,
    /// Idle hours before a cold lead is due a follow-up
    #[serde(default = "default_cold_idle_hours")]
    pub cold_idle_hours: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            domain_config_path: None,
            expose_agent_contact: false,
            max_followups: default_max_followups(),
            warm_idle_hours: default_warm_idle_hours(),
            cold_idle_hours: default_cold_idle_hours(),
        }
    }
}

fn default_max_followups() -> u32 {
    2
}

fn default_warm_idle_hours() -> u32 {
    2
}

fn default_cold_idle_hours() -> u32 {
    24
}

/// Logging and metrics settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level when RUST_LOG is not set (trace|debug|info|warn|error)
    #[serde(default = "default_log_level")]
    pub log_level: String,
    /// Emit JSON log lines instead of human-readable ones
    #[serde(default)]
    pub log_json: bool,
    /// Serve Prometheus metrics at /metrics
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_json: false,
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Settings {
    /// Validate settings after loading, before the server starts
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_server()?;
        self.validate_data()?;
        self.validate_engine()?;
        self.validate_observability()?;
        Ok(())
    }

    fn validate_server(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                message: "port must be non-zero".to_string(),
            });
        }
        if self.server.request_timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.request_timeout_secs".to_string(),
                message: "timeout must be at least 1 second".to_string(),
            });
        }
        if self.environment.is_production() && !self.server.cors_enabled {
            return Err(ConfigError::InvalidValue {
                field: "server.cors_enabled".to_string(),
                message: "CORS checks cannot be disabled in production".to_string(),
            });
        }
        Ok(())
    }

    fn validate_data(&self) -> Result<(), ConfigError> {
        let paths = [
            ("data.roster_path", &self.data.roster_path),
            ("data.counters_path", &self.data.counters_path),
            ("data.leads_log_path", &self.data.leads_log_path),
            ("data.routing_log_path", &self.data.routing_log_path),
            ("data.hot_events_path", &self.data.hot_events_path),
            ("data.followups_path", &self.data.followups_path),
        ];
        for (field, value) in paths {
            if value.trim().is_empty() {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    message: "path must not be empty".to_string(),
                });
            }
        }
        Ok(())
    }

    fn validate_engine(&self) -> Result<(), ConfigError> {
        if self.engine.max_followups == 0 {
            return Err(ConfigError::InvalidValue {
                field: "engine.max_followups".to_string(),
                message: "at least one follow-up must be allowed".to_string(),
            });
        }
        if self.engine.warm_idle_hours > self.engine.cold_idle_hours {
            return Err(ConfigError::InvalidValue {
                field: "engine.warm_idle_hours".to_string(),
                message: "warm leads cannot wait longer than cold leads".to_string(),
            });
        }
        Ok(())
    }

    fn validate_observability(&self) -> Result<(), ConfigError> {
        const LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];
        if !LEVELS.contains(&self.observability.log_level.as_str()) {
            return Err(ConfigError::InvalidValue {
                field: "observability.log_level".to_string(),
                message: format!(
                    "unknown level '{}', expected one of {:?}",
                    self.observability.log_level, LEVELS
                ),
            });
        }
        Ok(())
    }
}

/// Load settings from files and environment variables
///
/// Priority (later wins): defaults < config/default.yaml <
/// config/{env}.yaml < LEAD_TRIAGE__* environment variables.
pub fn load_settings(env: Option<&str>) -> Result<Settings, ConfigError> {
    let mut builder = Config::builder()
        .add_source(File::with_name("config/default").required(false));

    if let Some(env_name) = env {
        builder = builder.add_source(File::with_name(&format!("config/{}", env_name)).required(false));
    }

    let config = builder
        .add_source(
            Environment::with_prefix("LEAD_TRIAGE")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let settings: Settings = config.try_deserialize()?;
    settings.validate()?;
    Ok(settings)
}

//! Agent roster and routing outcome types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::lead::Operation;

/// Priority tier used for temperature alignment in routing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgentTier {
    Senior,
    Standard,
    Junior,
}

/// One human sales agent as loaded from the roster store. Immutable within
/// a routing decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    #[serde(default = "default_active")]
    pub active: bool,
    pub operations: Vec<Operation>,
    /// Covered neighborhoods; empty or containing "*" means unrestricted.
    #[serde(default)]
    pub neighborhoods: Vec<String>,
    /// Coverage tags for distance-to-coast, kept as raw roster strings and
    /// normalized at scoring time so unknown tags never match.
    #[serde(default)]
    pub micro_tags: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<i64>,
    #[serde(default)]
    pub specialties: Vec<String>,
    #[serde(default = "default_capacity")]
    pub daily_capacity: u32,
    #[serde(default = "default_tier")]
    pub tier: AgentTier,
}

fn default_active() -> bool {
    true
}

fn default_capacity() -> u32 {
    20
}

fn default_tier() -> AgentTier {
    AgentTier::Standard
}

impl Agent {
    /// Wildcard coverage or an explicit generalist specialty.
    pub fn is_generalist(&self) -> bool {
        self.neighborhoods.iter().any(|n| n == "*")
            || self.specialties.iter().any(|s| s == "generalista")
    }

    pub fn supports(&self, operation: Operation) -> bool {
        self.operations.contains(&operation)
    }

    pub fn covers_neighborhood(&self, neighborhood: &str) -> bool {
        let wanted = neighborhood.trim().to_lowercase();
        self.neighborhoods
            .iter()
            .any(|n| n == "*" || n.trim().to_lowercase() == wanted)
    }
}

/// Per-agent assignment counter for "today". Reset when the stored date
/// differs from the current date.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AssignmentRecord {
    #[serde(default)]
    pub assigned_today: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_assigned_at: Option<DateTime<Utc>>,
}

/// Strategy that produced a routing decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutingStrategy {
    ScoreBased,
    FallbackGeneralist,
    FallbackDefaultQueue,
    FallbackDefaultQueueMismatch,
}

impl RoutingStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            RoutingStrategy::ScoreBased => "score_based",
            RoutingStrategy::FallbackGeneralist => "fallback_generalist",
            RoutingStrategy::FallbackDefaultQueue => "fallback_default_queue",
            RoutingStrategy::FallbackDefaultQueueMismatch => "fallback_default_queue_mismatch",
        }
    }

    pub fn is_fallback(&self) -> bool {
        !matches!(self, RoutingStrategy::ScoreBased)
    }
}

/// Outcome of one routing decision.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoutingResult {
    pub agent_id: String,
    pub agent_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact: Option<String>,
    pub score: i32,
    pub reasons: Vec<String>,
    pub strategy: RoutingStrategy,
    pub evaluated_agents: usize,
    pub fallback: bool,
}

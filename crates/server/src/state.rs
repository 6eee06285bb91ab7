//! Application State
//!
//! One engine instance shared across all handlers. The stores behind it
//! are cheap handles onto the data files named in the settings; the
//! roster and counter handles are kept separately so the admin and
//! readiness endpoints can exercise them directly.

use std::sync::Arc;

use lead_triage_config::{DomainConfig, Settings};
use lead_triage_core::{CounterStore, EventSink, NeighborhoodDirectory, RosterStore};
use lead_triage_engine::TriageEngine;
use lead_triage_extraction::RuleBasedExtractor;
use lead_triage_persistence::{
    FileCounterStore, FileNeighborhoodDirectory, FileRosterStore, JsonlEventLog,
};
use lead_triage_routing::AgentRouter;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<TriageEngine>,
    pub roster: Arc<dyn RosterStore>,
    pub counters: Arc<dyn CounterStore>,
    pub settings: Arc<Settings>,
}

impl AppState {
    /// Create application state, loading the domain config named in the
    /// settings (or the built-in defaults).
    pub fn new(settings: Settings) -> Self {
        let domain = Arc::new(DomainConfig::load_or_default(
            settings.engine.domain_config_path.as_deref(),
        ));
        Self::with_domain(settings, domain)
    }

    /// Create application state around an already loaded domain config.
    pub fn with_domain(settings: Settings, domain: Arc<DomainConfig>) -> Self {
        let roster: Arc<dyn RosterStore> =
            Arc::new(FileRosterStore::from_data_config(&settings.data));
        let counters: Arc<dyn CounterStore> =
            Arc::new(FileCounterStore::from_data_config(&settings.data));
        let events: Arc<dyn EventSink> = Arc::new(JsonlEventLog::from_data_config(&settings.data));
        let directory: Arc<dyn NeighborhoodDirectory> =
            Arc::new(FileNeighborhoodDirectory::from_data_config(&settings.data));
        let extractor = Arc::new(RuleBasedExtractor::new(
            domain.vocabulary.clone(),
            domain.handoff.clone(),
        ));
        let router = Arc::new(AgentRouter::new(
            roster.clone(),
            counters.clone(),
            events.clone(),
            domain.routing.clone(),
        ));
        let engine = Arc::new(TriageEngine::new(
            domain,
            settings.engine.clone(),
            extractor,
            directory,
            router,
            events,
        ));

        Self {
            engine,
            roster,
            counters,
            settings: Arc::new(settings),
        }
    }
}

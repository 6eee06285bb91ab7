//! Agent selection over the scored roster.
//!
//! The decision sequence is score, rank, fall back, record. Counter reads
//! and the assignment increment happen under one lock so two concurrent
//! decisions cannot jointly overshoot a daily capacity.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use metrics::counter;
use parking_lot::Mutex;
use serde_json::json;
use uuid::Uuid;

use lead_triage_config::domain::RoutingThresholds;
use lead_triage_core::{
    Agent, AssignmentRecord, CounterStore, EventSink, EventStream, RosterStore, RoutingResult,
    RoutingStrategy,
};

use crate::error::RoutingError;
use crate::score::{covers_explicitly, score_agent, LeadProfile};

struct Candidate {
    agent: Agent,
    score: i32,
    reasons: Vec<String>,
    record: AssignmentRecord,
}

pub struct AgentRouter {
    roster: Arc<dyn RosterStore>,
    counters: Arc<dyn CounterStore>,
    events: Arc<dyn EventSink>,
    thresholds: RoutingThresholds,
    // Serializes the snapshot -> capacity check -> increment sequence.
    decision_lock: Mutex<()>,
}

impl AgentRouter {
    pub fn new(
        roster: Arc<dyn RosterStore>,
        counters: Arc<dyn CounterStore>,
        events: Arc<dyn EventSink>,
        thresholds: RoutingThresholds,
    ) -> Self {
        Self {
            roster,
            counters,
            events,
            thresholds,
            decision_lock: Mutex::new(()),
        }
    }

    /// Picks the best agent for a triaged lead, or `None` when no agent is
    /// assignable. `priority` lets hot leads pass capacity limits.
    pub fn assign(
        &self,
        lead: &LeadProfile,
        priority: bool,
    ) -> Result<Option<RoutingResult>, RoutingError> {
        let correlation_id = Uuid::new_v4().to_string();
        let agents = self.roster.load().map_err(RoutingError::Roster)?;
        if agents.is_empty() {
            tracing::warn!(
                session_id = %lead.session_id,
                correlation_id = %correlation_id,
                "no agents in roster"
            );
            return Ok(None);
        }

        let _guard = self.decision_lock.lock();
        let counters = self.counters.snapshot().map_err(RoutingError::Counters)?;

        let mut candidates: Vec<Candidate> = Vec::new();
        let mut coverage_match_exists = false;
        for agent in &agents {
            if let Some(neighborhood) = &lead.neighborhood {
                if covers_explicitly(agent, neighborhood) {
                    coverage_match_exists = true;
                }
            }
            let record = counters.get(&agent.id).cloned().unwrap_or_default();
            let (score, reasons) = score_agent(agent, lead, &record, priority, &self.thresholds);
            if score > self.thresholds.hard_filter {
                candidates.push(Candidate {
                    agent: agent.clone(),
                    score,
                    reasons,
                    record,
                });
            } else {
                tracing::debug!(
                    agent_id = %agent.id,
                    reasons = ?reasons,
                    correlation_id = %correlation_id,
                    "agent excluded"
                );
            }
        }

        if candidates.is_empty() {
            tracing::info!(
                session_id = %lead.session_id,
                correlation_id = %correlation_id,
                "no compatible agents, trying fallbacks"
            );
            return Ok(self.fallback(
                &agents,
                &counters,
                lead,
                coverage_match_exists,
                &correlation_id,
            ));
        }

        // Best score first; ties go to the least-loaded agent, then to the
        // agent idle longest (never-assigned sorts before any timestamp).
        candidates.sort_by(|a, b| {
            (std::cmp::Reverse(a.score), a.record.assigned_today, a.record.last_assigned_at)
                .cmp(&(
                    std::cmp::Reverse(b.score),
                    b.record.assigned_today,
                    b.record.last_assigned_at,
                ))
        });

        let evaluated = candidates.len();
        let best = candidates.swap_remove(0);
        let result = self.commit(
            &best.agent,
            best.score,
            best.reasons,
            RoutingStrategy::ScoreBased,
            evaluated,
            lead,
            &correlation_id,
        );
        Ok(Some(result))
    }

    /// Fallback chain: operation-compatible generalists first, then the
    /// least-loaded active agent, which a neighborhood requirement only
    /// tolerates when some agent actually covered that neighborhood.
    fn fallback(
        &self,
        agents: &[Agent],
        counters: &BTreeMap<String, AssignmentRecord>,
        lead: &LeadProfile,
        coverage_match_exists: bool,
        correlation_id: &str,
    ) -> Option<RoutingResult> {
        let assigned_today = |agent: &Agent| {
            counters
                .get(&agent.id)
                .map(|r| r.assigned_today)
                .unwrap_or(0)
        };
        let operation_ok = |agent: &Agent| match lead.operation {
            Some(operation) => agent.supports(operation),
            None => true,
        };

        let mut generalists: Vec<&Agent> = agents
            .iter()
            .filter(|a| a.active && operation_ok(a))
            .filter(|a| {
                if lead.neighborhood.is_some() {
                    a.is_generalist()
                } else {
                    a.is_generalist() || a.neighborhoods.is_empty()
                }
            })
            .collect();

        if !generalists.is_empty() {
            generalists.sort_by_key(|a| assigned_today(a));
            let chosen = generalists[0];
            tracing::info!(
                agent_id = %chosen.id,
                correlation_id = %correlation_id,
                "fallback to generalist"
            );
            return Some(self.commit(
                chosen,
                0,
                vec!["fallback_generalist".to_string()],
                RoutingStrategy::FallbackGeneralist,
                agents.len(),
                lead,
                correlation_id,
            ));
        }

        let mut active: Vec<&Agent> = agents
            .iter()
            .filter(|a| a.active && operation_ok(a))
            .collect();
        if active.is_empty() {
            tracing::warn!(
                session_id = %lead.session_id,
                correlation_id = %correlation_id,
                "no active compatible agents at all"
            );
            return None;
        }

        if lead.neighborhood.is_some() && !coverage_match_exists {
            tracing::info!(
                session_id = %lead.session_id,
                neighborhood = ?lead.neighborhood,
                correlation_id = %correlation_id,
                "no coverage for requested neighborhood, refusing default queue"
            );
            return None;
        }

        active.sort_by_key(|a| assigned_today(a));
        let chosen = active[0];
        let strategy = if lead.neighborhood.is_some() {
            RoutingStrategy::FallbackDefaultQueueMismatch
        } else {
            RoutingStrategy::FallbackDefaultQueue
        };
        tracing::info!(
            agent_id = %chosen.id,
            strategy = strategy.as_str(),
            correlation_id = %correlation_id,
            "fallback to default queue"
        );
        Some(self.commit(
            chosen,
            0,
            vec![strategy.as_str().to_string()],
            strategy,
            agents.len(),
            lead,
            correlation_id,
        ))
    }

    fn commit(
        &self,
        agent: &Agent,
        score: i32,
        reasons: Vec<String>,
        strategy: RoutingStrategy,
        evaluated: usize,
        lead: &LeadProfile,
        correlation_id: &str,
    ) -> RoutingResult {
        if let Err(err) = self.counters.record_assignment(&agent.id) {
            tracing::error!(
                agent_id = %agent.id,
                error = %err,
                "failed to persist assignment counter"
            );
        }

        let result = RoutingResult {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            contact: agent.contact.clone(),
            score,
            reasons,
            strategy,
            evaluated_agents: evaluated,
            fallback: strategy.is_fallback(),
        };
        if result.fallback {
            counter!("lead_triage_routing_fallbacks_total", "strategy" => strategy.as_str())
                .increment(1);
        }

        tracing::info!(
            agent_id = %result.agent_id,
            agent_name = %result.agent_name,
            score = result.score,
            strategy = strategy.as_str(),
            temperature = ?lead.temperature,
            session_id = %lead.session_id,
            correlation_id = %correlation_id,
            "assigned agent"
        );

        let record = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "correlation_id": correlation_id,
            "agent_id": result.agent_id,
            "agent_name": result.agent_name,
            "score": result.score,
            "reasons": result.reasons,
            "fallback": result.fallback,
            "strategy": strategy.as_str(),
            "evaluated_agents": result.evaluated_agents,
            "lead_temperature": lead.temperature.map(|t| t.as_str()),
            "lead_session_id": lead.session_id,
        });
        if let Err(err) = self.events.append(EventStream::RoutingDecisions, &record) {
            tracing::warn!(error = %err, "failed to append routing decision");
        }

        result
    }
}

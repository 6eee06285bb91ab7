//! Prometheus metrics endpoint.
//!
//! The engine and the router record their counters through the `metrics`
//! facade at the decision sites; this module installs the process-wide
//! Prometheus recorder and serves the rendered exposition text. Until
//! `init_metrics` runs (or when it fails) the facade calls are no-ops
//! and `/metrics` answers 503.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use metrics::{describe_counter, describe_histogram, histogram, Unit};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;

static HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the global Prometheus recorder. Idempotent; returns `None`
/// when no recorder could be installed.
pub fn init_metrics() -> Option<PrometheusHandle> {
    let installed = HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;
        describe_metrics();
        Ok::<_, BuildError>(handle)
    });
    match installed {
        Ok(handle) => Some(handle.clone()),
        Err(e) => {
            tracing::warn!(error = %e, "failed to install Prometheus recorder, metrics disabled");
            None
        }
    }
}

fn describe_metrics() {
    describe_counter!("lead_triage_turns_total", "Conversation turns processed");
    describe_counter!(
        "lead_triage_conflicts_total",
        "Contradictions of confirmed fields that triggered a clarification"
    );
    describe_counter!(
        "lead_triage_completions_total",
        "Completed triages, labelled by assigned SLA"
    );
    describe_counter!("lead_triage_hot_leads_total", "Hot lead events emitted");
    describe_counter!(
        "lead_triage_routing_fallbacks_total",
        "Routing decisions that resorted to a fallback strategy"
    );
    describe_histogram!(
        "lead_triage_turn_duration_seconds",
        Unit::Seconds,
        "Wall time of one turn, request to reply"
    );
}

/// Records the wall time of one `/api/turn` request.
pub fn record_turn_latency(seconds: f64) {
    histogram!("lead_triage_turn_duration_seconds").record(seconds);
}

/// GET /metrics
pub async fn metrics_handler() -> Response {
    match HANDLE.get() {
        Some(handle) => handle.render().into_response(),
        None => (
            StatusCode::SERVICE_UNAVAILABLE,
            "metrics recorder not installed",
        )
            .into_response(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn init_is_idempotent_and_rendering_includes_recorded_series() {
        let first = init_metrics();
        let second = init_metrics();
        assert!(first.is_some());
        assert!(second.is_some());

        record_turn_latency(0.012);
        let text = first.unwrap().render();
        assert!(text.contains("lead_triage_turn_duration_seconds"));
    }
}

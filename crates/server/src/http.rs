//! HTTP API
//!
//! REST surface over the triage engine plus the operational endpoints.
//! Handlers stay thin: validate, call the engine, map lookup misses to
//! 404. Everything slow or fallible lives behind the engine and the
//! stores.

use std::time::{Duration, Instant};

use axum::{
    extract::{Path, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::IntoResponse,
    routing::{delete, get, post},
    Json, Router,
};
use serde::Deserialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use lead_triage_core::FieldUpdate;
use lead_triage_engine::{SessionState, TurnOutcome};

use crate::metrics::{metrics_handler, record_turn_latency};
use crate::state::AppState;

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    let cors_layer = build_cors_layer(
        &state.settings.server.cors_origins,
        state.settings.server.cors_enabled,
    );
    let timeout = Duration::from_secs(state.settings.server.request_timeout_secs);

    Router::new()
        // Triage endpoints
        .route("/api/turn", post(handle_turn))
        .route("/api/sessions/:id", get(get_session))
        .route("/api/sessions/:id", delete(reset_session))
        .route("/api/sessions/:id/followup", get(get_followup))
        .route("/api/sessions/:id/followup", post(claim_followup))
        // Admin endpoints
        .route("/api/roster/reload", post(reload_roster))
        // Health checks
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        // Prometheus metrics
        .route("/metrics", get(metrics_handler))
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(timeout))
        .layer(cors_layer)
        .with_state(state)
}

/// Build the CORS layer from configured origins
///
/// - If cors_enabled is false, returns a permissive layer (for dev)
/// - If cors_origins is empty, defaults to localhost:3000 for safety
/// - Otherwise, uses the configured origins
fn build_cors_layer(origins: &[String], enabled: bool) -> CorsLayer {
    if !enabled {
        tracing::warn!("CORS is disabled - allowing all origins (NOT FOR PRODUCTION)");
        return CorsLayer::permissive();
    }

    if origins.is_empty() {
        tracing::info!("No CORS origins configured, defaulting to localhost:3000");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    let parsed_origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| {
            origin.parse::<HeaderValue>().ok().or_else(|| {
                tracing::warn!("Invalid CORS origin: {}", origin);
                None
            })
        })
        .collect();

    if parsed_origins.is_empty() {
        tracing::error!("All configured CORS origins are invalid, falling back to localhost");
        return CorsLayer::new()
            .allow_origin("http://localhost:3000".parse::<HeaderValue>().unwrap())
            .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
            .allow_headers(Any);
    }

    tracing::info!("CORS configured with {} origins", parsed_origins.len());
    // Credentials forbid wildcard headers, so name the one we accept.
    CorsLayer::new()
        .allow_origin(parsed_origins)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

/// One conversation turn.
#[derive(Debug, Deserialize)]
struct TurnRequest {
    session_id: String,
    #[serde(default)]
    message: String,
    /// Structured batch from the language layer; absent means the
    /// rule-based extractor runs over the raw message.
    #[serde(default)]
    updates: Option<Vec<FieldUpdate>>,
}

async fn handle_turn(
    State(state): State<AppState>,
    Json(request): Json<TurnRequest>,
) -> Result<Json<TurnOutcome>, StatusCode> {
    if request.session_id.trim().is_empty() {
        return Err(StatusCode::BAD_REQUEST);
    }
    let started = Instant::now();
    let outcome = state
        .engine
        .handle_turn(&request.session_id, &request.message, request.updates);
    record_turn_latency(started.elapsed().as_secs_f64());
    Ok(Json(outcome))
}

async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<SessionState>, StatusCode> {
    let snapshot = state
        .engine
        .session_snapshot(&id)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(snapshot))
}

async fn reset_session(State(state): State<AppState>, Path(id): Path<String>) -> StatusCode {
    match state.engine.reset_session(&id) {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::NOT_FOUND,
    }
}

async fn get_followup(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, StatusCode> {
    let followup = state
        .engine
        .followup_preview(&id)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(Json(serde_json::json!({
        "session_id": id,
        "due": followup.is_some(),
        "followup": followup,
    })))
}

/// Confirmation that a previewed nudge was actually sent.
#[derive(Debug, Deserialize)]
struct FollowupClaim {
    key: String,
}

async fn claim_followup(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(claim): Json<FollowupClaim>,
) -> Result<StatusCode, StatusCode> {
    state
        .engine
        .record_followup(&id, &claim.key)
        .map_err(|_| StatusCode::NOT_FOUND)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Re-reads the roster file so an operator can verify an edit took.
/// Routing always reads the file fresh; this endpoint only reports.
async fn reload_roster(State(state): State<AppState>) -> impl IntoResponse {
    match state.roster.load() {
        Ok(agents) => {
            let active = agents.iter().filter(|agent| agent.active).count();
            tracing::info!(agents = agents.len(), active, "roster reloaded");
            (
                StatusCode::OK,
                Json(serde_json::json!({
                    "status": "reloaded",
                    "agents": agents.len(),
                    "active": active,
                })),
            )
        }
        Err(e) => {
            tracing::error!(error = %e, "roster reload failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({
                    "status": "error",
                    "message": e.to_string(),
                })),
            )
        }
    }
}

async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let data = &state.settings.data;
    let mut checks = serde_json::Map::new();
    let mut all_healthy = true;

    // Check 1: roster file present (primary or seed)
    let roster_ok = std::path::Path::new(&data.roster_path).exists()
        || std::path::Path::new(&data.roster_example_path).exists();
    checks.insert(
        "roster".to_string(),
        serde_json::json!({
            "status": if roster_ok { "ok" } else { "missing" },
            "path": data.roster_path.clone(),
        }),
    );
    if !roster_ok {
        all_healthy = false;
    }

    // Check 2: session store
    checks.insert(
        "sessions".to_string(),
        serde_json::json!({
            "status": "ok",
            "count": state.engine.session_count(),
        }),
    );

    let status = if all_healthy { "healthy" } else { "degraded" };
    let status_code = if all_healthy {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": status,
            "version": env!("CARGO_PKG_VERSION"),
            "checks": checks,
        })),
    )
}

/// Readiness exercises the stores instead of only checking paths: a
/// roster that exists but no longer parses must fail here.
async fn readiness_check(State(state): State<AppState>) -> (StatusCode, Json<serde_json::Value>) {
    let mut checks = serde_json::Map::new();
    let mut ready = true;

    match state.roster.load() {
        Ok(agents) => {
            checks.insert(
                "roster".to_string(),
                serde_json::json!({"status": "ok", "agents": agents.len()}),
            );
        }
        Err(e) => {
            ready = false;
            checks.insert(
                "roster".to_string(),
                serde_json::json!({"status": "error", "message": e.to_string()}),
            );
        }
    }

    match state.counters.snapshot() {
        Ok(counters) => {
            checks.insert(
                "counters".to_string(),
                serde_json::json!({"status": "ok", "agents": counters.len()}),
            );
        }
        Err(e) => {
            ready = false;
            checks.insert(
                "counters".to_string(),
                serde_json::json!({"status": "error", "message": e.to_string()}),
            );
        }
    }

    let status = if ready { "ready" } else { "not_ready" };
    let status_code = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (
        status_code,
        Json(serde_json::json!({
            "status": status,
            "checks": checks,
        })),
    )
}

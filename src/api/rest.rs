// =============================================================================
// REST API Endpoints — Axum 0.7
// =============================================================================
//
// All endpoints live under `/api/v1/`.  The analyzer is read-mostly: clients
// post a price series, get the report back, and may fetch the latest report
// again later for charting.
//
// Request validation (window ranges and ordering, non-empty series, ordered
// timestamps, positive closes) happens here.  The metric modules never reject input.
//
// CORS is configured permissively for development.
// =============================================================================

use std::sync::Arc;

use axum::{
    extract::{Json, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tracing::{info, warn};

use crate::analysis::{analyze, AnalysisParams, AnalysisReport};
use crate::app_state::AppState;
use crate::market_data::{ensure_positive_closes, ensure_strictly_increasing};
use crate::runtime_config::validate_windows;
use crate::types::{Interval, PricePoint};

type ApiError = (StatusCode, Json<serde_json::Value>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(serde_json::json!({
            "error": message.into(),
        })),
    )
}

// =============================================================================
// Router construction
// =============================================================================

/// Build the full REST API router with CORS middleware and shared state.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/v1/health", get(health))
        .route("/api/v1/analyze", post(run_analysis))
        .route("/api/v1/report", get(latest_report))
        .route("/api/v1/config", get(get_config))
        .route("/api/v1/config", post(set_config))
        .layer(cors)
        .with_state(state)
}

// =============================================================================
// Health
// =============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    state_version: u64,
    uptime_secs: u64,
    server_time: i64,
}

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let resp = HealthResponse {
        status: "ok",
        state_version: state.current_state_version(),
        uptime_secs: state.uptime_secs(),
        server_time: chrono::Utc::now().timestamp_millis(),
    };
    Json(resp)
}

// =============================================================================
// Analysis
// =============================================================================

#[derive(Deserialize)]
struct AnalyzeRequest {
    prices: Vec<PricePoint>,
    #[serde(default)]
    instrument: Option<String>,
    #[serde(default)]
    interval: Option<Interval>,
    #[serde(default)]
    short_window: Option<usize>,
    #[serde(default)]
    long_window: Option<usize>,
    #[serde(default)]
    include_rsi: Option<bool>,
}

async fn run_analysis(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Json<Arc<AnalysisReport>>, ApiError> {
    let mut params = AnalysisParams::from(&*state.runtime_config.read());
    if let Some(interval) = req.interval {
        params.interval = interval;
    }
    if let Some(short) = req.short_window {
        params.short_window = short;
    }
    if let Some(long) = req.long_window {
        params.long_window = long;
    }
    if let Some(include_rsi) = req.include_rsi {
        params.include_rsi = include_rsi;
    }
    if req.instrument.is_some() {
        params.instrument = req.instrument;
    }

    validate_windows(params.short_window, params.long_window)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    if req.prices.iter().all(|p| p.close.is_none()) {
        return Err(api_error(
            StatusCode::UNPROCESSABLE_ENTITY,
            "No data found for the given series.",
        ));
    }

    ensure_strictly_increasing(&req.prices)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;
    ensure_positive_closes(&req.prices)
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    let prices = req.prices;
    let report = tokio::task::spawn_blocking(move || analyze(&prices, &params))
        .await
        .map_err(|e| {
            warn!(error = %e, "analysis task failed");
            api_error(StatusCode::INTERNAL_SERVER_ERROR, "analysis task failed")
        })?;

    let report = state.store_report(report);
    Ok(Json(report))
}

async fn latest_report(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match state.latest_report() {
        Some(report) => Json(report).into_response(),
        None => {
            let body = serde_json::json!({ "report": null, "message": "No analysis has run yet" });
            Json(body).into_response()
        }
    }
}

// =============================================================================
// Config
// =============================================================================

async fn get_config(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let config = state.runtime_config.read().clone();
    Json(config)
}

#[derive(Deserialize)]
struct ConfigUpdate {
    #[serde(default)]
    interval: Option<Interval>,
    #[serde(default)]
    short_window: Option<usize>,
    #[serde(default)]
    long_window: Option<usize>,
    #[serde(default)]
    include_rsi: Option<bool>,
    #[serde(default)]
    unknown_interval_periods_per_year: Option<f64>,
}

async fn set_config(
    State(state): State<Arc<AppState>>,
    Json(update): Json<ConfigUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let mut candidate = state.runtime_config.read().clone();
    if let Some(interval) = update.interval {
        candidate.interval = interval;
    }
    if let Some(short) = update.short_window {
        candidate.short_window = short;
    }
    if let Some(long) = update.long_window {
        candidate.long_window = long;
    }
    if let Some(include_rsi) = update.include_rsi {
        candidate.include_rsi = include_rsi;
    }
    if let Some(periods) = update.unknown_interval_periods_per_year {
        candidate.unknown_interval_periods_per_year = periods;
    }

    candidate
        .validate()
        .map_err(|e| api_error(StatusCode::UNPROCESSABLE_ENTITY, e.to_string()))?;

    *state.runtime_config.write() = candidate.clone();
    state.increment_version();
    info!(
        interval = %candidate.interval,
        short_window = candidate.short_window,
        long_window = candidate.long_window,
        include_rsi = candidate.include_rsi,
        "analysis defaults updated via API"
    );

    // Save to disk (best-effort).
    if let Err(e) = candidate.save(&state.config_path) {
        warn!(error = %e, "Failed to save analyzer config to disk");
    }

    Ok(Json(candidate))
}

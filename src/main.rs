// =============================================================================
// Equity Trend Analyzer — Main Entry Point
// =============================================================================
//
// Loads the analysis defaults, optionally analyses a price file straight
// away, then serves reports over the REST API until Ctrl+C.
// =============================================================================

use std::sync::Arc;

use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use equity_trend_analyzer::analysis::{analyze, AnalysisParams};
use equity_trend_analyzer::api;
use equity_trend_analyzer::app_state::AppState;
use equity_trend_analyzer::market_data;
use equity_trend_analyzer::runtime_config::AnalyzerConfig;

const DEFAULT_CONFIG_PATH: &str = "analyzer_config.json";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    info!("Equity Trend Analyzer starting up");

    let config_path =
        std::env::var("ANALYZER_CONFIG").unwrap_or_else(|_| DEFAULT_CONFIG_PATH.into());

    let mut config = AnalyzerConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        AnalyzerConfig::default()
    });

    if let Ok(path) = std::env::var("ANALYZER_PRICE_FILE") {
        config.price_file = Some(path);
    }
    if let Ok(instrument) = std::env::var("ANALYZER_INSTRUMENT") {
        config.instrument = Some(instrument);
    }

    info!(
        instrument = ?config.instrument,
        interval = %config.interval,
        short_window = config.short_window,
        long_window = config.long_window,
        include_rsi = config.include_rsi,
        "Analysis defaults"
    );

    // ── 2. Build shared state ────────────────────────────────────────────
    let state = Arc::new(AppState::new(config.clone(), &config_path));

    // ── 3. Initial analysis (optional) ───────────────────────────────────
    if let Some(path) = config.price_file.as_deref() {
        match market_data::load_price_series(path) {
            Ok(prices) if prices.iter().any(|p| p.close.is_some()) => {
                let params = AnalysisParams::from(&config);
                let report = analyze(&prices, &params);
                match serde_json::to_string_pretty(&report) {
                    Ok(json) => println!("{json}"),
                    Err(e) => warn!(error = %e, "Failed to render report"),
                }
                state.store_report(report);
            }
            Ok(_) => warn!(path = %path, "No data found in price file"),
            Err(e) => error!(error = %e, path = %path, "Failed to load price file"),
        }
    }

    // ── 4. Start the API server ──────────────────────────────────────────
    let bind_addr =
        std::env::var("ANALYZER_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3001".into());
    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    info!(addr = %bind_addr, "API server listening");

    let app = api::rest::router(state.clone());
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!(error = %e, "Failed to listen for shutdown signal");
            }
            warn!("Shutdown signal received — stopping gracefully");
        })
        .await?;

    // ── 5. Graceful shutdown ─────────────────────────────────────────────
    if let Err(e) = state.runtime_config.read().save(&state.config_path) {
        error!(error = %e, "Failed to save analyzer config on shutdown");
    }

    info!("Equity Trend Analyzer shut down complete.");
    Ok(())
}

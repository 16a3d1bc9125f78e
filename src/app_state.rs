// =============================================================================
// Central Application State — Trend Analyzer
// =============================================================================
//
// Shared by every API handler through `Arc<AppState>`.  The metric modules
// own no state; this struct only remembers the current analysis defaults and
// the most recent report for the dashboard feed.
//
// Thread safety:
//   - Atomic counter for lock-free version tracking.
//   - parking_lot::RwLock for the mutable config and latest report.
// =============================================================================

use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use crate::analysis::AnalysisReport;
use crate::runtime_config::AnalyzerConfig;

pub struct AppState {
    /// Incremented whenever the config or the latest report changes.
    pub state_version: AtomicU64,

    pub runtime_config: Arc<RwLock<AnalyzerConfig>>,

    /// Where config updates are persisted.
    pub config_path: PathBuf,

    pub latest_report: RwLock<Option<Arc<AnalysisReport>>>,

    /// Instant when the service was started. Used for uptime calculations.
    pub start_time: std::time::Instant,
}

impl AppState {
    pub fn new(config: AnalyzerConfig, config_path: impl Into<PathBuf>) -> Self {
        Self {
            state_version: AtomicU64::new(0),
            runtime_config: Arc::new(RwLock::new(config)),
            config_path: config_path.into(),
            latest_report: RwLock::new(None),
            start_time: std::time::Instant::now(),
        }
    }

    pub fn current_state_version(&self) -> u64 {
        self.state_version.load(Ordering::Relaxed)
    }

    pub fn increment_version(&self) -> u64 {
        self.state_version.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Replace the latest report and bump the version.
    pub fn store_report(&self, report: AnalysisReport) -> Arc<AnalysisReport> {
        let report = Arc::new(report);
        *self.latest_report.write() = Some(report.clone());
        let version = self.increment_version();
        debug!(id = %report.id, version, "latest report stored");
        report
    }

    pub fn latest_report(&self) -> Option<Arc<AnalysisReport>> {
        self.latest_report.read().clone()
    }

    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }
}

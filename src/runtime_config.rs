// =============================================================================
// Runtime Configuration — analysis defaults with atomic save
// =============================================================================
//
// Holds the defaults applied to every analysis request: bar interval, the two
// moving-average windows, whether RSI is computed, and the annualisation
// constant for intervals without a known one.
//
// Persistence uses an atomic tmp + rename pattern to prevent corruption on
// crash.  All fields carry `#[serde(default)]` so that adding new fields
// never breaks loading an older config file.
//
// Window range and ordering checks live here, on the caller side; the
// metric modules accept whatever they are given.
// =============================================================================

use std::ops::RangeInclusive;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::{Interval, TRADING_DAYS_PER_YEAR};

/// Accepted short moving-average windows.
pub const SHORT_WINDOW_RANGE: RangeInclusive<usize> = 5..=200;

/// Accepted long moving-average windows.
pub const LONG_WINDOW_RANGE: RangeInclusive<usize> = 10..=300;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_true() -> bool {
    true
}

fn default_short_window() -> usize {
    20
}

fn default_long_window() -> usize {
    50
}

fn default_unknown_interval_periods_per_year() -> f64 {
    TRADING_DAYS_PER_YEAR
}

// =============================================================================
// AnalyzerConfig
// =============================================================================

/// Top-level configuration for the analyzer service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Bar interval of incoming price series ("1d", "1h", ...).
    #[serde(default)]
    pub interval: Interval,

    /// Short moving-average window, in bars.
    #[serde(default = "default_short_window")]
    pub short_window: usize,

    /// Long moving-average window, in bars.
    #[serde(default = "default_long_window")]
    pub long_window: usize,

    /// Compute the RSI curve.
    #[serde(default = "default_true")]
    pub include_rsi: bool,

    /// Periods per year used to annualise volatility when the interval has
    /// no known constant.
    #[serde(default = "default_unknown_interval_periods_per_year")]
    pub unknown_interval_periods_per_year: f64,

    /// Price file analysed at startup, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_file: Option<String>,

    /// Instrument the startup price file belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            interval: Interval::Daily,
            short_window: default_short_window(),
            long_window: default_long_window(),
            include_rsi: true,
            unknown_interval_periods_per_year: default_unknown_interval_periods_per_year(),
            price_file: None,
            instrument: None,
        }
    }
}

impl AnalyzerConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// If the file does not exist, returns an error so the caller can fall
    /// back to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read analyzer config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse analyzer config from {}", path.display()))?;

        config
            .validate()
            .with_context(|| format!("invalid analyzer config in {}", path.display()))?;

        info!(
            path = %path.display(),
            interval = %config.interval,
            short_window = config.short_window,
            long_window = config.long_window,
            "analyzer config loaded"
        );

        Ok(config)
    }

    /// Persist the current configuration to `path` using an atomic write
    /// (write to `.tmp`, then rename).
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        let content = serde_json::to_string_pretty(self)
            .context("failed to serialise analyzer config to JSON")?;

        let tmp_path = path.with_extension("json.tmp");

        std::fs::write(&tmp_path, &content)
            .with_context(|| format!("failed to write tmp config to {}", tmp_path.display()))?;

        std::fs::rename(&tmp_path, path)
            .with_context(|| format!("failed to rename tmp config to {}", path.display()))?;

        info!(path = %path.display(), "analyzer config saved (atomic)");
        Ok(())
    }

    /// Check the configured windows and annualisation constant.
    pub fn validate(&self) -> Result<()> {
        validate_windows(self.short_window, self.long_window)?;
        if !(self.unknown_interval_periods_per_year.is_finite()
            && self.unknown_interval_periods_per_year > 0.0)
        {
            bail!(
                "unknown_interval_periods_per_year must be positive, got {}",
                self.unknown_interval_periods_per_year
            );
        }
        Ok(())
    }
}

/// Caller-side window checks: both windows in range and short < long.
pub fn validate_windows(short_window: usize, long_window: usize) -> Result<()> {
    if !SHORT_WINDOW_RANGE.contains(&short_window) {
        bail!(
            "Short MA period must be between {} and {}, got {short_window}",
            SHORT_WINDOW_RANGE.start(),
            SHORT_WINDOW_RANGE.end()
        );
    }
    if !LONG_WINDOW_RANGE.contains(&long_window) {
        bail!(
            "Long MA period must be between {} and {}, got {long_window}",
            LONG_WINDOW_RANGE.start(),
            LONG_WINDOW_RANGE.end()
        );
    }
    if short_window >= long_window {
        bail!("Short MA period should be less than Long MA period.");
    }
    Ok(())
}

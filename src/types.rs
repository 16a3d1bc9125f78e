// =============================================================================
// Shared types used across the trend analyzer
// =============================================================================
//
// Every series is an ordered `Vec` of timestamped points.  The core never
// mutates a caller's series; each stage returns a freshly allocated one.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Trading days per year used to annualise daily returns.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// Regular trading hours per session, used to annualise hourly returns.
pub const TRADING_HOURS_PER_DAY: f64 = 6.5;

// ---------------------------------------------------------------------------
// Series points
// ---------------------------------------------------------------------------

/// One raw row as delivered by the data source.  `close` is `None` when the
/// provider had no usable close price for that timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub close: Option<f64>,
}

/// A timestamped value that is always defined (clean closes, returns,
/// drawdown).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub value: f64,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A timestamped value that may be undefined (moving averages, RSI).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub timestamp: DateTime<Utc>,
    pub value: Option<f64>,
}

/// Return the most recent defined value of a curve.
pub fn last_defined(curve: &[CurvePoint]) -> Option<f64> {
    curve.iter().rev().find_map(|p| p.value)
}

// ---------------------------------------------------------------------------
// Interval
// ---------------------------------------------------------------------------

/// Bar interval of the price series.  Only daily and hourly bars carry a
/// known annualisation constant; anything else is kept verbatim so the
/// caller decides how to scale it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Interval {
    Daily,
    Hourly,
    Other(String),
}

impl Interval {
    /// Parse a provider interval code such as `"1d"` or `"1h"`.
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1d" => Self::Daily,
            "1h" => Self::Hourly,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn code(&self) -> &str {
        match self {
            Self::Daily => "1d",
            Self::Hourly => "1h",
            Self::Other(code) => code,
        }
    }

    /// Annualisation constant for recognised intervals, `None` otherwise.
    pub fn periods_per_year(&self) -> Option<f64> {
        match self {
            Self::Daily => Some(TRADING_DAYS_PER_YEAR),
            Self::Hourly => Some(TRADING_DAYS_PER_YEAR * TRADING_HOURS_PER_DAY),
            Self::Other(_) => None,
        }
    }
}

impl Default for Interval {
    fn default() -> Self {
        Self::Daily
    }
}

impl From<String> for Interval {
    fn from(code: String) -> Self {
        Self::from_code(&code)
    }
}

impl From<Interval> for String {
    fn from(interval: Interval) -> Self {
        interval.code().to_string()
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

// ---------------------------------------------------------------------------
// Labels
// ---------------------------------------------------------------------------

/// Discrete classification of a log-price regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrendLabel {
    Uptrend,
    Downtrend,
    Flat,
    NoClearTrend,
}

impl fmt::Display for TrendLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Uptrend => write!(f, "Uptrend"),
            Self::Downtrend => write!(f, "Downtrend"),
            Self::Flat => write!(f, "Flat"),
            Self::NoClearTrend => write!(f, "No Clear Trend"),
        }
    }
}

/// Point-in-time relative position of the short and long moving averages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum MomentumSignal {
    ShortAboveLong { short_period: usize, long_period: usize },
    ShortBelowLong { short_period: usize, long_period: usize },
    Equal,
    NotAvailable,
}

impl fmt::Display for MomentumSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ShortAboveLong {
                short_period,
                long_period,
            } => write!(
                f,
                "{short_period}D MA above {long_period}D MA (Above long-term average)"
            ),
            Self::ShortBelowLong {
                short_period,
                long_period,
            } => write!(
                f,
                "{short_period}D MA below {long_period}D MA (Below long-term average)"
            ),
            Self::Equal => write!(f, "MAs equal"),
            Self::NotAvailable => write!(f, "N/A"),
        }
    }
}

/// Overbought / oversold reading of the latest RSI value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RsiZone {
    Overbought,
    Oversold,
    Neutral,
}

impl fmt::Display for RsiZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Overbought => write!(f, "OVERBOUGHT"),
            Self::Oversold => write!(f, "OVERSOLD"),
            Self::Neutral => write!(f, "NEUTRAL"),
        }
    }
}

// =============================================================================
// Risk Metrics — total return, annualised volatility, maximum drawdown
// =============================================================================
//
// Stateless functions over the cleaned close and return series.
//
//   total_return          = close[last] / close[first] - 1
//   annualized_volatility = sample σ(returns) * sqrt(periods_per_year)
//   drawdown[t]           = close[t] / max(close[0..=t]) - 1
//
// Annualisation assumes i.i.d., roughly stationary returns over the window.
// That is a simplification of the scaling, not a property of the data.
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::types::{Interval, Observation, TRADING_DAYS_PER_YEAR};

/// Result of a drawdown scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Drawdown {
    /// Most negative drawdown, `None` for an empty series.
    pub max: Option<f64>,
    /// Drawdown at every point; all values are <= 0.
    pub curve: Vec<Observation>,
}

/// Fractional change from the first to the last close.  Empty input is 0.
pub fn total_return(closes: &[Observation]) -> f64 {
    match (closes.first(), closes.last()) {
        (Some(first), Some(last)) => last.value / first.value - 1.0,
        _ => 0.0,
    }
}

/// Annualised volatility using the interval's own constant, falling back to
/// the daily constant for intervals without one.
pub fn annualized_volatility(returns: &[Observation], interval: &Interval) -> f64 {
    annualized_volatility_or(returns, interval, TRADING_DAYS_PER_YEAR)
}

/// Annualised volatility with an explicit constant for unrecognised
/// intervals.
pub fn annualized_volatility_or(
    returns: &[Observation],
    interval: &Interval,
    fallback_periods_per_year: f64,
) -> f64 {
    let periods_per_year = interval.periods_per_year().unwrap_or_else(|| {
        debug!(
            interval = %interval,
            fallback = fallback_periods_per_year,
            "volatility: unrecognised interval, using fallback annualisation"
        );
        fallback_periods_per_year
    });

    match sample_std_dev(returns) {
        Some(std_dev) => std_dev * periods_per_year.sqrt(),
        None => 0.0,
    }
}

/// Running-peak drawdown curve and its minimum.
pub fn max_drawdown(closes: &[Observation]) -> Drawdown {
    let mut curve = Vec::with_capacity(closes.len());
    let mut peak = f64::NEG_INFINITY;
    let mut max: Option<f64> = None;

    for obs in closes {
        if obs.value > peak {
            peak = obs.value;
        }
        let dd = obs.value / peak - 1.0;
        max = Some(match max {
            Some(m) if m <= dd => m,
            _ => dd,
        });
        curve.push(Observation::new(obs.timestamp, dd));
    }

    Drawdown { max, curve }
}

// =============================================================================
// Internal helpers
// =============================================================================

/// Sample (n - 1) standard deviation.  Undefined below two points.
fn sample_std_dev(values: &[Observation]) -> Option<f64> {
    if values.len() < 2 {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().map(|o| o.value).sum::<f64>() / n;
    let variance = values
        .iter()
        .map(|o| (o.value - mean).powi(2))
        .sum::<f64>()
        / (n - 1.0);
    let std_dev = variance.sqrt();
    std_dev.is_finite().then_some(std_dev)
}

// =============================================================================
// Log-Price Trend Regression
// =============================================================================
//
// Fits   ln(price) = slope * t + intercept   by ordinary least squares over
// t = 0..n-1 and measures the fit with
//
//   R² = 1 - SS_res / SS_tot
//
// Classification gates on R² first and only then looks at the slope sign, so
// a steep slope with a poor fit is still "No Clear Trend":
//
//   R² < 0.25  => NoClearTrend
//   slope > 0  => Uptrend
//   slope < 0  => Downtrend
//   otherwise  => Flat
// =============================================================================

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::types::{Observation, TrendLabel};

/// Minimum number of usable prices before a trend is reported.
pub const MIN_REGRESSION_POINTS: usize = 5;

/// R² below which the slope is not trusted.
pub const MIN_TREND_R_SQUARED: f64 = 0.25;

/// Slope and goodness of fit of the log-price regression.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionResult {
    pub slope: f64,
    pub r_squared: f64,
}

impl RegressionResult {
    pub const INSUFFICIENT: Self = Self {
        slope: 0.0,
        r_squared: 0.0,
    };
}

/// Full least-squares fit in log space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LogTrendFit {
    pub slope: f64,
    pub intercept: f64,
    pub r_squared: f64,
}

/// Fit the log-price line over every usable close.
///
/// Returns `None` when the time index has no variance (fewer than two usable
/// points).
pub fn fit_log_trend(closes: &[Observation]) -> Option<LogTrendFit> {
    let log_prices = usable_log_prices(closes);
    let n = log_prices.len();
    if n < 2 {
        trace!(points = n, "regression: zero variance in time index");
        return None;
    }

    // Zero total variance: the mean of identical logs may round away from
    // them, so this case is answered exactly instead of via the sums below.
    let first = log_prices[0];
    if log_prices.iter().all(|&y| y == first) {
        return Some(LogTrendFit {
            slope: 0.0,
            intercept: first,
            r_squared: 0.0,
        });
    }

    let n_f = n as f64;
    let t_mean = (0..n).map(|t| t as f64).sum::<f64>() / n_f;
    let y_mean = log_prices.iter().sum::<f64>() / n_f;

    let mut numerator = 0.0_f64;
    let mut denominator = 0.0_f64;
    for (t, &y) in log_prices.iter().enumerate() {
        let dt = t as f64 - t_mean;
        numerator += dt * (y - y_mean);
        denominator += dt * dt;
    }

    if denominator == 0.0 {
        trace!(points = n, "regression: degenerate time index");
        return None;
    }

    let slope = numerator / denominator;
    let intercept = y_mean - slope * t_mean;

    let (ss_res, ss_tot) = log_prices.iter().enumerate().fold(
        (0.0_f64, 0.0_f64),
        |(res, tot), (t, &y)| {
            let fitted = slope * t as f64 + intercept;
            (res + (y - fitted).powi(2), tot + (y - y_mean).powi(2))
        },
    );

    let r_squared = if ss_tot == 0.0 {
        0.0
    } else {
        (1.0 - ss_res / ss_tot).clamp(0.0, 1.0)
    };

    Some(LogTrendFit {
        slope,
        intercept,
        r_squared,
    })
}

/// Slope and R² of the log-price trend.
///
/// Fewer than [`MIN_REGRESSION_POINTS`] usable prices, or a degenerate fit,
/// yields slope = 0 and R² = 0.
pub fn regression_trend(closes: &[Observation]) -> RegressionResult {
    let usable = closes.iter().filter(|o| is_usable(o.value)).count();
    if usable < MIN_REGRESSION_POINTS {
        trace!(
            points = usable,
            min = MIN_REGRESSION_POINTS,
            "regression: insufficient data"
        );
        return RegressionResult::INSUFFICIENT;
    }

    match fit_log_trend(closes) {
        Some(fit) => RegressionResult {
            slope: fit.slope,
            r_squared: fit.r_squared,
        },
        None => RegressionResult::INSUFFICIENT,
    }
}

/// Label a regression result.
pub fn type_of_trend(slope: f64, r_squared: f64) -> TrendLabel {
    if r_squared < MIN_TREND_R_SQUARED {
        return TrendLabel::NoClearTrend;
    }
    if slope > 0.0 {
        TrendLabel::Uptrend
    } else if slope < 0.0 {
        TrendLabel::Downtrend
    } else {
        TrendLabel::Flat
    }
}

/// Fitted trend in price space, `exp(slope * t + intercept)`, stamped with
/// the timestamps of the usable closes.  Empty when no line can be fitted.
pub fn trend_line(closes: &[Observation]) -> Vec<Observation> {
    let Some(fit) = fit_log_trend(closes) else {
        return Vec::new();
    };

    closes
        .iter()
        .filter(|o| is_usable(o.value))
        .enumerate()
        .map(|(t, o)| Observation::new(o.timestamp, (fit.slope * t as f64 + fit.intercept).exp()))
        .collect()
}

// =============================================================================
// Internal helpers
// =============================================================================

/// A price can enter log space only when it is finite and positive.
fn is_usable(price: f64) -> bool {
    price.is_finite() && price > 0.0
}

fn usable_log_prices(closes: &[Observation]) -> Vec<f64> {
    closes
        .iter()
        .filter(|o| is_usable(o.value))
        .map(|o| o.value.ln())
        .collect()
}

// =============================================================================
// Relative Strength Index (RSI) — rolling-mean gains / losses
// =============================================================================
//
// Step 1 — Price change per point; the first point has no predecessor and
//          counts as a zero change.
// Step 2 — gain = max(change, 0), loss = max(-change, 0).
// Step 3 — avg_gain / avg_loss = trailing mean over RSI_PERIOD points.
// Step 4 — RS  = avg_gain / avg_loss
//          RSI = 100 - 100 / (1 + RS)
//
// Limits:
//   avg_loss == 0, avg_gain > 0  => RS = +inf, RSI = 100.
//   avg_loss == 0, avg_gain == 0 => 0/0, RSI undefined for that point.
//
// The output is aligned with the input; its first RSI_PERIOD - 1 points are
// always undefined.
//
// Thresholds:  RSI >= 70 => OVERBOUGHT,  RSI <= 30 => OVERSOLD.
// =============================================================================

use crate::indicators::rolling::RollingMean;
use crate::types::{last_defined, CurvePoint, Observation, RsiZone};

/// Fixed look-back of the oscillator.
pub const RSI_PERIOD: usize = 14;

pub const OVERBOUGHT: f64 = 70.0;
pub const OVERSOLD: f64 = 30.0;

/// Compute the RSI curve for `closes` over [`RSI_PERIOD`] points.
pub fn rsi(closes: &[Observation]) -> Vec<CurvePoint> {
    rsi_over(closes, RSI_PERIOD)
}

/// Return the most recent defined RSI value together with its zone.
pub fn latest_rsi(curve: &[CurvePoint]) -> Option<(f64, RsiZone)> {
    let value = last_defined(curve)?;
    Some((value, rsi_zone(value)))
}

pub fn rsi_zone(value: f64) -> RsiZone {
    if value >= OVERBOUGHT {
        RsiZone::Overbought
    } else if value <= OVERSOLD {
        RsiZone::Oversold
    } else {
        RsiZone::Neutral
    }
}

// =============================================================================
// Internal helpers
// =============================================================================

fn rsi_over(closes: &[Observation], period: usize) -> Vec<CurvePoint> {
    let mut gains = RollingMean::new(period);
    let mut losses = RollingMean::new(period);
    let mut prev: Option<f64> = None;

    closes
        .iter()
        .map(|obs| {
            let change = prev.map_or(0.0, |p| obs.value - p);
            prev = Some(obs.value);

            let avg_gain = gains.push(change.max(0.0));
            let avg_loss = losses.push((-change).max(0.0));

            let value = match (avg_gain, avg_loss) {
                (Some(g), Some(l)) => rsi_from_averages(g, l),
                _ => None,
            };
            CurvePoint {
                timestamp: obs.timestamp,
                value,
            }
        })
        .collect()
}

/// Convert average gain / average loss into an RSI value in [0, 100].
///
/// Returns `None` for the flat 0/0 case and for non-finite results.
fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> Option<f64> {
    if avg_loss == 0.0 && avg_gain == 0.0 {
        return None; // No movement at all.
    }

    let rsi = if avg_loss == 0.0 {
        100.0 // All gains, no losses.
    } else {
        let rs = avg_gain / avg_loss;
        100.0 - 100.0 / (1.0 + rs)
    };

    rsi.is_finite().then_some(rsi.clamp(0.0, 100.0))
}

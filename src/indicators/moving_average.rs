// =============================================================================
// Simple Moving Average & Momentum Signal
// =============================================================================
//
// moving_average  — trailing arithmetic mean over `period` closes, undefined
//                   for the first `period - 1` points.
// momentum_signal — compares the latest defined value of a short and a long
//                   moving average.  This is the current relative position,
//                   not a crossover-event detector.
//
// Keeping short < long is the caller's job; nothing here checks it.
// =============================================================================

use crate::indicators::rolling::RollingMean;
use crate::types::{last_defined, CurvePoint, MomentumSignal, Observation};

/// Compute the simple moving average curve for `closes`.
///
/// The output has one point per close.  With fewer than `period` closes (or
/// `period == 0`) every point is undefined.
pub fn moving_average(closes: &[Observation], period: usize) -> Vec<CurvePoint> {
    let mut roller = RollingMean::new(period);
    closes
        .iter()
        .map(|obs| CurvePoint {
            timestamp: obs.timestamp,
            value: roller.push(obs.value),
        })
        .collect()
}

/// Classify the latest relative position of the two moving averages.
///
/// Returns `NotAvailable` when either curve has no defined point.
pub fn momentum_signal(
    short_ma: &[CurvePoint],
    long_ma: &[CurvePoint],
    short_period: usize,
    long_period: usize,
) -> MomentumSignal {
    let (Some(short_last), Some(long_last)) = (last_defined(short_ma), last_defined(long_ma))
    else {
        return MomentumSignal::NotAvailable;
    };

    if short_last > long_last {
        MomentumSignal::ShortAboveLong {
            short_period,
            long_period,
        }
    } else if short_last < long_last {
        MomentumSignal::ShortBelowLong {
            short_period,
            long_period,
        }
    } else {
        MomentumSignal::Equal
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[f64]) -> Vec<Observation> {
        let t0 = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| Observation::new(t0 + Duration::days(i as i64), v))
            .collect()
    }

    fn defined(curve: &[CurvePoint]) -> usize {
        curve.iter().filter(|p| p.value.is_some()).count()
    }

    // ---- moving_average --------------------------------------------------

    #[test]
    fn ma_shorter_than_window_is_undefined() {
        let ma = moving_average(&series(&[1.0, 2.0, 3.0]), 5);
        assert_eq!(ma.len(), 3);
        assert_eq!(defined(&ma), 0);
    }

    #[test]
    fn ma_defined_count() {
        for n in 1..20 {
            let closes: Vec<f64> = (0..n).map(|i| 100.0 + i as f64).collect();
            for w in 1..8 {
                let ma = moving_average(&series(&closes), w);
                let expected = if n >= w { n - w + 1 } else { 0 };
                assert_eq!(defined(&ma), expected, "n={n} w={w}");
                // Undefined points are exactly the leading w - 1.
                assert!(ma.iter().skip(w - 1).all(|p| p.value.is_some()));
            }
        }
    }

    #[test]
    fn ma_values_and_timestamps() {
        let closes = series(&[2.0, 4.0, 6.0, 8.0]);
        let ma = moving_average(&closes, 2);
        assert_eq!(ma[0].value, None);
        assert!((ma[1].value.unwrap() - 3.0).abs() < 1e-12);
        assert!((ma[3].value.unwrap() - 7.0).abs() < 1e-12);
        assert_eq!(ma[3].timestamp, closes[3].timestamp);
    }

    // ---- momentum_signal -------------------------------------------------

    #[test]
    fn signal_short_above_long() {
        let closes = series(&[100.0, 102.0, 101.0, 105.0, 107.0, 106.0, 110.0]);
        let short = moving_average(&closes, 2);
        let long = moving_average(&closes, 3);
        // Latest: short = 108, long = 107.666...
        assert_eq!(
            momentum_signal(&short, &long, 2, 3),
            MomentumSignal::ShortAboveLong {
                short_period: 2,
                long_period: 3
            }
        );
    }

    #[test]
    fn signal_short_below_long() {
        let closes = series(&[110.0, 108.0, 106.0, 104.0, 102.0, 100.0]);
        let short = moving_average(&closes, 2);
        let long = moving_average(&closes, 4);
        assert_eq!(
            momentum_signal(&short, &long, 2, 4),
            MomentumSignal::ShortBelowLong {
                short_period: 2,
                long_period: 4
            }
        );
    }

    #[test]
    fn signal_equal_on_flat_prices() {
        let closes = series(&[50.0; 10]);
        let short = moving_average(&closes, 3);
        let long = moving_average(&closes, 6);
        assert_eq!(momentum_signal(&short, &long, 3, 6), MomentumSignal::Equal);
    }

    #[test]
    fn signal_equal_on_flat_prices_with_inexact_decimals() {
        for &price in &[0.1, 0.3, 12.07, 33.33, 101.37, 187.61, 1234.56] {
            let closes = series(&vec![price; 120]);
            let short = moving_average(&closes, 20);
            let long = moving_average(&closes, 50);
            assert_eq!(
                momentum_signal(&short, &long, 20, 50),
                MomentumSignal::Equal,
                "price {price}"
            );
            assert_eq!(last_defined(&short), Some(price));
            assert_eq!(last_defined(&long), Some(price));
        }
    }

    #[test]
    fn signal_not_available_when_window_exceeds_series() {
        let closes = series(&[1.0, 2.0, 3.0, 4.0]);
        let short = moving_average(&closes, 2);
        let long = moving_average(&closes, 10);
        assert_eq!(
            momentum_signal(&short, &long, 2, 10),
            MomentumSignal::NotAvailable
        );
        assert_eq!(momentum_signal(&[], &[], 2, 10), MomentumSignal::NotAvailable);
    }
}

// =============================================================================
// Series Preprocessing
// =============================================================================
//
// Turns the raw rows delivered by the data source into the two series every
// metric is computed from:
//
//   closes  — rows with a usable close price, original order preserved.
//             A usable close is finite and strictly positive; a zero or
//             negative quote has no meaningful return or log price.
//   returns — simple percent change  close[t] / close[t-1] - 1,
//             one element shorter than `closes` (the first change is
//             undefined and dropped).
//
// Empty or all-missing input produces two empty series; this is not an error.

use tracing::trace;

use crate::types::{Observation, PricePoint};

/// Drop rows whose close is missing, non-finite or not strictly positive.
pub fn clean_closes(raw: &[PricePoint]) -> Vec<Observation> {
    let closes: Vec<Observation> = raw
        .iter()
        .filter_map(|p| match p.close {
            Some(c) if c.is_finite() && c > 0.0 => Some(Observation::new(p.timestamp, c)),
            _ => None,
        })
        .collect();

    if closes.len() < raw.len() {
        trace!(
            raw = raw.len(),
            kept = closes.len(),
            "preprocess: dropped rows without a usable close"
        );
    }

    closes
}

/// Period-over-period fractional change, stamped with the later timestamp.
pub fn pct_returns(closes: &[Observation]) -> Vec<Observation> {
    closes
        .windows(2)
        .map(|w| Observation::new(w[1].timestamp, w[1].value / w[0].value - 1.0))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn raw(closes: &[Option<f64>]) -> Vec<PricePoint> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        closes
            .iter()
            .enumerate()
            .map(|(i, &close)| PricePoint {
                timestamp: t0 + Duration::days(i as i64),
                close,
            })
            .collect()
    }

    #[test]
    fn missing_rows_are_dropped_in_order() {
        let input = raw(&[Some(10.0), None, Some(11.0), Some(f64::NAN), Some(12.0)]);
        let closes = clean_closes(&input);
        let values: Vec<f64> = closes.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![10.0, 11.0, 12.0]);
        assert_eq!(closes[1].timestamp, input[2].timestamp);
    }

    #[test]
    fn non_positive_closes_are_dropped() {
        let input = raw(&[Some(0.0), Some(1.0), Some(-2.0), Some(2.0), Some(0.0), Some(4.0)]);
        let closes = clean_closes(&input);
        let values: Vec<f64> = closes.iter().map(|o| o.value).collect();
        assert_eq!(values, vec![1.0, 2.0, 4.0]);

        let returns = pct_returns(&closes);
        assert!(returns.iter().all(|r| r.value.is_finite()));
        assert!((returns[1].value - 1.0).abs() < 1e-12);
    }

    #[test]
    fn empty_input_yields_empty_series() {
        let closes = clean_closes(&[]);
        assert!(closes.is_empty());
        assert!(pct_returns(&closes).is_empty());

        let all_missing = clean_closes(&raw(&[None, None]));
        assert!(all_missing.is_empty());
    }

    #[test]
    fn returns_are_one_shorter() {
        let closes = clean_closes(&raw(&[Some(100.0), Some(110.0), Some(99.0)]));
        let returns = pct_returns(&closes);
        assert_eq!(returns.len(), 2);
        assert!((returns[0].value - 0.10).abs() < 1e-12);
        assert!((returns[1].value - (99.0 / 110.0 - 1.0)).abs() < 1e-12);
        assert_eq!(returns[0].timestamp, closes[1].timestamp);
    }

    #[test]
    fn single_close_has_no_returns() {
        let closes = clean_closes(&raw(&[Some(42.0)]));
        assert_eq!(closes.len(), 1);
        assert!(pct_returns(&closes).is_empty());
    }
}

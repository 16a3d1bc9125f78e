// =============================================================================
// Price File — JSON price series loader
// =============================================================================
//
// Accepts a JSON array of rows:
//
//   [ { "timestamp": "2024-01-02T00:00:00Z", "close": 185.64 },
//     { "timestamp": "2024-01-03T00:00:00Z", "close": null }, ... ]
//
// `close` may be null or absent; those rows are dropped later by the
// preprocessor.  Timestamps must be strictly increasing and any close that
// is present must be a positive price.

use std::path::Path;

use anyhow::{bail, Context, Result};
use tracing::info;

use crate::types::PricePoint;

/// Read and check a price series from `path`.
pub fn load_price_series(path: impl AsRef<Path>) -> Result<Vec<PricePoint>> {
    let path = path.as_ref();

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read price file {}", path.display()))?;

    let rows = parse_price_series(&content)
        .with_context(|| format!("failed to parse price file {}", path.display()))?;

    info!(
        path = %path.display(),
        rows = rows.len(),
        first = ?rows.first().map(|r| r.timestamp),
        last = ?rows.last().map(|r| r.timestamp),
        "price series loaded"
    );

    Ok(rows)
}

/// Parse a JSON price series and check its ordering and prices.
pub fn parse_price_series(json: &str) -> Result<Vec<PricePoint>> {
    let rows: Vec<PricePoint> = serde_json::from_str(json).context("malformed price series JSON")?;
    ensure_strictly_increasing(&rows)?;
    ensure_positive_closes(&rows)?;
    Ok(rows)
}

/// Reject rows whose close is present but zero, negative or non-finite.
pub fn ensure_positive_closes(rows: &[PricePoint]) -> Result<()> {
    if let Some((i, row)) = rows
        .iter()
        .enumerate()
        .find(|(_, r)| matches!(r.close, Some(c) if !(c.is_finite() && c > 0.0)))
    {
        bail!(
            "close prices must be positive: row {} ({}) has close {}",
            i,
            row.timestamp,
            row.close.unwrap_or_default()
        );
    }
    Ok(())
}

/// Reject series whose timestamps are not strictly increasing.
pub fn ensure_strictly_increasing(rows: &[PricePoint]) -> Result<()> {
    if let Some((i, pair)) = rows
        .windows(2)
        .enumerate()
        .find(|(_, w)| w[1].timestamp <= w[0].timestamp)
    {
        bail!(
            "timestamps must be strictly increasing: row {} ({}) is not after row {} ({})",
            i + 1,
            pair[1].timestamp,
            i,
            pair[0].timestamp
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_rows_with_missing_closes() {
        let json = r#"[
            { "timestamp": "2024-01-02T00:00:00Z", "close": 185.64 },
            { "timestamp": "2024-01-03T00:00:00Z", "close": null },
            { "timestamp": "2024-01-04T00:00:00Z" }
        ]"#;
        let rows = parse_price_series(json).unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].close, Some(185.64));
        assert_eq!(rows[1].close, None);
        assert_eq!(rows[2].close, None);
    }

    #[test]
    fn empty_array_is_valid() {
        assert!(parse_price_series("[]").unwrap().is_empty());
    }

    #[test]
    fn out_of_order_rows_are_rejected() {
        let json = r#"[
            { "timestamp": "2024-01-03T00:00:00Z", "close": 1.0 },
            { "timestamp": "2024-01-02T00:00:00Z", "close": 2.0 }
        ]"#;
        let err = parse_price_series(json).unwrap_err();
        assert!(err.to_string().contains("strictly increasing"));
    }

    #[test]
    fn duplicate_timestamps_are_rejected() {
        let json = r#"[
            { "timestamp": "2024-01-02T00:00:00Z", "close": 1.0 },
            { "timestamp": "2024-01-02T00:00:00Z", "close": 2.0 }
        ]"#;
        assert!(parse_price_series(json).is_err());
    }

    #[test]
    fn zero_close_is_rejected() {
        let json = r#"[
            { "timestamp": "2024-01-02T00:00:00Z", "close": 0.0 },
            { "timestamp": "2024-01-03T00:00:00Z", "close": 1.0 }
        ]"#;
        let err = parse_price_series(json).unwrap_err();
        assert!(err.to_string().contains("positive"));
    }

    #[test]
    fn negative_close_is_rejected() {
        let json = r#"[
            { "timestamp": "2024-01-02T00:00:00Z", "close": 3.0 },
            { "timestamp": "2024-01-03T00:00:00Z", "close": -1.5 }
        ]"#;
        assert!(parse_price_series(json).is_err());
    }

    #[test]
    fn load_from_disk() {
        let path = std::env::temp_dir().join(format!("prices-{}.json", uuid::Uuid::new_v4()));
        std::fs::write(
            &path,
            r#"[{ "timestamp": "2024-01-02T00:00:00Z", "close": 10.0 }]"#,
        )
        .unwrap();
        let rows = load_price_series(&path).unwrap();
        assert_eq!(rows.len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn load_missing_file_errors() {
        assert!(load_price_series("/definitely/not/here.json").is_err());
    }
}

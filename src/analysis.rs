// =============================================================================
// Analysis Pipeline — one report per price series
// =============================================================================
//
// Preprocesses the raw rows once, then runs the four independent metric
// groups (risk, moving averages, regression, RSI) over the cleaned series
// and gathers everything the presentation side needs into an
// `AnalysisReport`.  Nothing here is shared or mutated between runs, so
// reports for different instruments can be produced concurrently.
// =============================================================================

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::indicators::{latest_rsi, momentum_signal, moving_average, rsi, RSI_PERIOD};
use crate::risk::{annualized_volatility_or, max_drawdown, total_return};
use crate::runtime_config::AnalyzerConfig;
use crate::series::{clean_closes, pct_returns};
use crate::trend::{regression_trend, trend_line, type_of_trend};
use crate::types::{
    last_defined, CurvePoint, Interval, MomentumSignal, Observation, PricePoint, RsiZone,
    TrendLabel, TRADING_DAYS_PER_YEAR,
};

// =============================================================================
// Parameters
// =============================================================================

/// Inputs that shape a run.  Window ordering is checked by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisParams {
    /// Ticker or name the series belongs to; carried into the report only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    pub interval: Interval,
    pub short_window: usize,
    pub long_window: usize,
    pub include_rsi: bool,
    /// Annualisation constant for intervals without a known one.
    pub unknown_interval_periods_per_year: f64,
}

impl Default for AnalysisParams {
    fn default() -> Self {
        Self {
            instrument: None,
            interval: Interval::Daily,
            short_window: 20,
            long_window: 50,
            include_rsi: true,
            unknown_interval_periods_per_year: TRADING_DAYS_PER_YEAR,
        }
    }
}

impl From<&AnalyzerConfig> for AnalysisParams {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            instrument: config.instrument.clone(),
            interval: config.interval.clone(),
            short_window: config.short_window,
            long_window: config.long_window,
            include_rsi: config.include_rsi,
            unknown_interval_periods_per_year: config.unknown_interval_periods_per_year,
        }
    }
}

// =============================================================================
// Report
// =============================================================================

/// A label together with its display text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Labelled<T> {
    pub value: T,
    pub text: String,
}

impl<T: std::fmt::Display> Labelled<T> {
    fn new(value: T) -> Self {
        let text = value.to_string();
        Self { value, text }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageBlock {
    pub period: usize,
    pub latest: Option<f64>,
    pub curve: Vec<CurvePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RsiBlock {
    pub period: usize,
    pub latest: Option<f64>,
    pub zone: Option<RsiZone>,
    pub curve: Vec<CurvePoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Unique identifier for this run (UUID v4).
    pub id: String,
    pub generated_at: DateTime<Utc>,
    pub params: AnalysisParams,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub instrument: Option<String>,
    /// Number of usable closes after preprocessing.
    pub observations: usize,
    /// Date range covered by the usable closes.
    pub first_timestamp: Option<DateTime<Utc>>,
    pub last_timestamp: Option<DateTime<Utc>>,

    // --- Risk --------------------------------------------------------------
    pub total_return: f64,
    pub annualized_volatility: f64,
    /// `None` only for an empty series.
    pub max_drawdown: Option<f64>,
    pub drawdown_curve: Vec<Observation>,

    // --- Trend -------------------------------------------------------------
    pub slope: f64,
    pub r_squared: f64,
    pub trend: Labelled<TrendLabel>,
    pub trend_line: Vec<Observation>,

    // --- Momentum ----------------------------------------------------------
    pub short_ma: MovingAverageBlock,
    pub long_ma: MovingAverageBlock,
    pub momentum: Labelled<MomentumSignal>,

    // --- Oscillator --------------------------------------------------------
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rsi: Option<RsiBlock>,

    pub closes: Vec<Observation>,
}

// =============================================================================
// Entry point
// =============================================================================

/// Run every metric over `raw` and assemble the report.
///
/// Degenerate input (empty, all-missing, too short) never fails; it produces
/// zero / undefined / `NotAvailable` values as each metric defines.
pub fn analyze(raw: &[PricePoint], params: &AnalysisParams) -> AnalysisReport {
    let closes = clean_closes(raw);
    let returns = pct_returns(&closes);

    let total = total_return(&closes);
    let volatility = annualized_volatility_or(
        &returns,
        &params.interval,
        params.unknown_interval_periods_per_year,
    );
    let drawdown = max_drawdown(&closes);

    let regression = regression_trend(&closes);
    let trend = type_of_trend(regression.slope, regression.r_squared);

    let short_curve = moving_average(&closes, params.short_window);
    let long_curve = moving_average(&closes, params.long_window);
    let momentum = momentum_signal(
        &short_curve,
        &long_curve,
        params.short_window,
        params.long_window,
    );

    let rsi_block = params.include_rsi.then(|| {
        let curve = rsi(&closes);
        let latest = latest_rsi(&curve);
        RsiBlock {
            period: RSI_PERIOD,
            latest: latest.map(|(v, _)| v),
            zone: latest.map(|(_, z)| z),
            curve,
        }
    });

    let report = AnalysisReport {
        id: uuid::Uuid::new_v4().to_string(),
        generated_at: Utc::now(),
        params: params.clone(),
        instrument: params.instrument.clone(),
        observations: closes.len(),
        first_timestamp: closes.first().map(|o| o.timestamp),
        last_timestamp: closes.last().map(|o| o.timestamp),
        total_return: total,
        annualized_volatility: volatility,
        max_drawdown: drawdown.max,
        drawdown_curve: drawdown.curve,
        slope: regression.slope,
        r_squared: regression.r_squared,
        trend: Labelled::new(trend),
        trend_line: trend_line(&closes),
        short_ma: MovingAverageBlock {
            period: params.short_window,
            latest: last_defined(&short_curve),
            curve: short_curve,
        },
        long_ma: MovingAverageBlock {
            period: params.long_window,
            latest: last_defined(&long_curve),
            curve: long_curve,
        },
        momentum: Labelled::new(momentum),
        rsi: rsi_block,
        closes,
    };

    info!(
        id = %report.id,
        instrument = ?report.instrument,
        observations = report.observations,
        first = ?report.first_timestamp,
        last = ?report.last_timestamp,
        interval = %params.interval,
        total_return = report.total_return,
        volatility = report.annualized_volatility,
        max_drawdown = ?report.max_drawdown,
        trend = %report.trend.text,
        momentum = %report.momentum.text,
        rsi = ?report.rsi.as_ref().and_then(|r| r.latest),
        "analysis complete"
    );

    report
}

// =============================================================================
// Unit Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn raw(values: &[f64]) -> Vec<PricePoint> {
        let t0 = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        values
            .iter()
            .enumerate()
            .map(|(i, &v)| PricePoint {
                timestamp: t0 + Duration::days(i as i64),
                close: Some(v),
            })
            .collect()
    }

    fn params(short: usize, long: usize) -> AnalysisParams {
        AnalysisParams {
            short_window: short,
            long_window: long,
            ..AnalysisParams::default()
        }
    }

    #[test]
    fn empty_series_is_degenerate_not_fatal() {
        let report = analyze(&[], &AnalysisParams::default());
        assert_eq!(report.observations, 0);
        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.annualized_volatility, 0.0);
        assert_eq!(report.max_drawdown, None);
        assert!(report.drawdown_curve.is_empty());
        assert_eq!(report.first_timestamp, None);
        assert_eq!(report.last_timestamp, None);
        assert_eq!(report.trend.value, TrendLabel::NoClearTrend);
        assert_eq!(report.momentum.value, MomentumSignal::NotAvailable);
        assert!(report.trend_line.is_empty());
        let rsi = report.rsi.unwrap();
        assert!(rsi.curve.is_empty());
        assert_eq!(rsi.latest, None);
    }

    #[test]
    fn constant_prices() {
        let report = analyze(&raw(&[25.0; 40]), &params(5, 10));
        assert_eq!(report.total_return, 0.0);
        assert_eq!(report.annualized_volatility, 0.0);
        assert_eq!(report.max_drawdown, Some(0.0));
        assert_eq!(report.slope, 0.0);
        assert_eq!(report.r_squared, 0.0);
        assert_eq!(report.momentum.value, MomentumSignal::Equal);
        let rsi = report.rsi.unwrap();
        assert!(rsi.curve.iter().all(|p| p.value.is_none()));
        assert_eq!(rsi.zone, None);
    }

    #[test]
    fn constant_inexact_prices_give_equal_moving_averages() {
        for &price in &[0.1, 0.3, 12.07, 33.33, 101.37, 187.61, 1234.56] {
            let report = analyze(&raw(&vec![price; 120]), &params(20, 50));
            assert_eq!(report.momentum.value, MomentumSignal::Equal, "price {price}");
            assert_eq!(report.momentum.text, "MAs equal");
            assert_eq!(report.short_ma.latest, Some(price));
            assert_eq!(report.long_ma.latest, Some(price));
        }
    }

    #[test]
    fn zero_and_negative_closes_do_not_poison_metrics() {
        let report = analyze(&raw(&[0.0, 1.0, 2.0, -3.0, 3.0, 4.0, 5.0]), &params(2, 3));
        assert_eq!(report.observations, 5);
        assert!((report.total_return - 4.0).abs() < 1e-12);
        assert!(report.annualized_volatility.is_finite());
        assert_eq!(report.max_drawdown, Some(0.0));
        assert!(report.drawdown_curve.iter().all(|o| o.value <= 0.0));
        assert!(report.slope.is_finite());
    }

    #[test]
    fn report_carries_instrument_and_date_range() {
        let p = AnalysisParams {
            instrument: Some("MSFT".into()),
            ..params(2, 3)
        };
        let rows = raw(&[10.0, 11.0, 12.0, 13.0]);
        let report = analyze(&rows, &p);
        assert_eq!(report.instrument.as_deref(), Some("MSFT"));
        assert_eq!(report.first_timestamp, Some(rows[0].timestamp));
        assert_eq!(report.last_timestamp, Some(rows[3].timestamp));
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["instrument"], "MSFT");
    }

    #[test]
    fn short_above_long_scenario() {
        let report = analyze(&raw(&[100.0, 102.0, 101.0, 105.0, 107.0, 106.0, 110.0]), &params(2, 3));
        assert_eq!(
            report.momentum.value,
            MomentumSignal::ShortAboveLong {
                short_period: 2,
                long_period: 3
            }
        );
        assert_eq!(report.momentum.text, "2D MA above 3D MA (Above long-term average)");
        assert!((report.short_ma.latest.unwrap() - 108.0).abs() < 1e-12);
    }

    #[test]
    fn declining_scenario() {
        let report = analyze(&raw(&[110.0, 108.0, 106.0, 104.0, 102.0, 100.0]), &params(2, 3));
        let expected = 100.0 / 110.0 - 1.0;
        assert!((report.total_return - expected).abs() < 1e-12);
        assert!((report.max_drawdown.unwrap() - expected).abs() < 1e-12);
        assert_eq!(report.trend.value, TrendLabel::Downtrend);
        assert_eq!(report.trend.text, "Downtrend");
    }

    #[test]
    fn rsi_can_be_switched_off() {
        let p = AnalysisParams {
            include_rsi: false,
            ..params(2, 3)
        };
        let report = analyze(&raw(&[1.0, 2.0, 3.0]), &p);
        assert!(report.rsi.is_none());
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("rsi").is_none());
    }

    #[test]
    fn missing_closes_are_ignored() {
        let mut rows = raw(&[10.0, 11.0, 12.0]);
        rows.insert(
            1,
            PricePoint {
                timestamp: rows[0].timestamp + Duration::hours(12),
                close: None,
            },
        );
        let report = analyze(&rows, &params(2, 3));
        assert_eq!(report.observations, 3);
        assert!((report.total_return - 0.2).abs() < 1e-12);
    }

    #[test]
    fn windows_longer_than_series_give_not_available() {
        let report = analyze(&raw(&[1.0, 2.0, 3.0, 4.0]), &params(20, 50));
        assert!(report.short_ma.curve.iter().all(|p| p.value.is_none()));
        assert_eq!(report.momentum.value, MomentumSignal::NotAvailable);
        assert_eq!(report.momentum.text, "N/A");
    }

    #[test]
    fn params_follow_config() {
        let config = AnalyzerConfig {
            short_window: 10,
            long_window: 30,
            include_rsi: false,
            instrument: Some("SPY".into()),
            ..AnalyzerConfig::default()
        };
        let p = AnalysisParams::from(&config);
        assert_eq!(p.instrument.as_deref(), Some("SPY"));
        assert_eq!(p.short_window, 10);
        assert_eq!(p.long_window, 30);
        assert!(!p.include_rsi);
        assert_eq!(p.interval, Interval::Daily);
    }
}

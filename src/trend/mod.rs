// =============================================================================
// Trend Module
// =============================================================================
//
// Log-price linear regression and its discrete trend label.

pub mod regression;

pub use regression::{regression_trend, trend_line, type_of_trend};

// =============================================================================
// Equity Trend Analyzer — library root
// =============================================================================
//
// Trend and risk statistics for a single instrument's price series.  The
// metric modules (`series`, `risk`, `indicators`, `trend`) are pure functions
// over in-memory series; `analysis` runs them together.  The remaining modules
// are the service shell used by the binary.

pub mod analysis;
pub mod api;
pub mod app_state;
pub mod indicators;
pub mod market_data;
pub mod risk;
pub mod runtime_config;
pub mod series;
pub mod trend;
pub mod types;

// =============================================================================
// Technical Indicators Module
// =============================================================================
//
// Pure, side-effect-free indicator curves.  Every curve is aligned with its
// input closes and marks insufficient-history points as `None` rather than
// failing.

pub mod moving_average;
pub mod rolling;
pub mod rsi;

pub use moving_average::{momentum_signal, moving_average};
pub use rsi::{latest_rsi, rsi, RSI_PERIOD};

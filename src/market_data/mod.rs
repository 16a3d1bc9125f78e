pub mod price_file;

pub use price_file::{ensure_positive_closes, ensure_strictly_increasing, load_price_series};

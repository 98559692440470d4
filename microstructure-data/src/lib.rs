pub mod orderbook;

// Re-export commonly used items
pub use orderbook::{extract_metrics, load_orderbooks, parse_orderbooks, DEFAULT_EXCHANGE};

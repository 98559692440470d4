pub mod json_loader;
pub mod metric_extractor;

// Re-export commonly used items
pub use json_loader::{load_orderbooks, parse_orderbooks, parse_timestamp, DEFAULT_EXCHANGE};
pub use metric_extractor::{extract_metrics, metric_row, VOLUME_DECIMALS};

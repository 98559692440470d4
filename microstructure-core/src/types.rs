pub mod metric_table;
pub mod order_book;
pub mod time_series;

// Re-export common types
pub use metric_table::{MetricColumn, MetricExtraction, MetricRow, MetricTable};
pub use order_book::{OrderBookSnapshot, PriceLevel, SnapshotSeries};
pub use time_series::{SeriesPoint, TimeSeries};

/// Snapshot timestamps are kept as UTC instants
pub type Timestamp = chrono::DateTime<chrono::Utc>;

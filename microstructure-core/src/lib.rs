pub mod error;
pub mod stats;
pub mod types;

// Re-export commonly used items
pub use error::{MicrostructureError, Result};
pub use types::{
    MetricColumn, MetricExtraction, MetricRow, MetricTable, OrderBookSnapshot, PriceLevel,
    SeriesPoint, SnapshotSeries, TimeSeries, Timestamp,
};

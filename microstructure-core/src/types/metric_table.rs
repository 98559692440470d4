use crate::types::{TimeSeries, Timestamp};
use serde::{Deserialize, Serialize};

/// Derived metrics for one order book snapshot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MetricRow {
    pub timestamp: Timestamp,
    pub spread: f64,
    pub mid_price: f64,
    pub bid_volume: f64,
    pub ask_volume: f64,
    pub total_volume: f64,
    pub imbalance: f64,
    pub weighted_mid_price_ask: f64,
    pub weighted_mid_price_bid: f64,
    pub vwap: f64,
}

/// Named columns of a `MetricTable`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MetricColumn {
    Spread,
    MidPrice,
    BidVolume,
    AskVolume,
    TotalVolume,
    Imbalance,
    WeightedMidPriceAsk,
    WeightedMidPriceBid,
    Vwap,
}

impl MetricColumn {
    pub const ALL: [MetricColumn; 9] = [
        MetricColumn::Spread,
        MetricColumn::MidPrice,
        MetricColumn::BidVolume,
        MetricColumn::AskVolume,
        MetricColumn::TotalVolume,
        MetricColumn::Imbalance,
        MetricColumn::WeightedMidPriceAsk,
        MetricColumn::WeightedMidPriceBid,
        MetricColumn::Vwap,
    ];

    /// Display name used in reports
    pub fn name(&self) -> &'static str {
        match self {
            MetricColumn::Spread => "Spread",
            MetricColumn::MidPrice => "Mid Price",
            MetricColumn::BidVolume => "Bid Volume",
            MetricColumn::AskVolume => "Ask Volume",
            MetricColumn::TotalVolume => "Total Volume",
            MetricColumn::Imbalance => "OrderBook Imbalance",
            MetricColumn::WeightedMidPriceAsk => "Weighted MidPrice (Ask)",
            MetricColumn::WeightedMidPriceBid => "Weighted MidPrice (Bid)",
            MetricColumn::Vwap => "Volume Weighted Average Price",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|c| c.name() == name)
    }

    fn value(&self, row: &MetricRow) -> f64 {
        match self {
            MetricColumn::Spread => row.spread,
            MetricColumn::MidPrice => row.mid_price,
            MetricColumn::BidVolume => row.bid_volume,
            MetricColumn::AskVolume => row.ask_volume,
            MetricColumn::TotalVolume => row.total_volume,
            MetricColumn::Imbalance => row.imbalance,
            MetricColumn::WeightedMidPriceAsk => row.weighted_mid_price_ask,
            MetricColumn::WeightedMidPriceBid => row.weighted_mid_price_bid,
            MetricColumn::Vwap => row.vwap,
        }
    }
}

/// One `MetricRow` per snapshot timestamp, ascending
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MetricTable {
    rows: Vec<MetricRow>,
}

impl MetricTable {
    pub fn new(rows: Vec<MetricRow>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Extract one column as a timestamp-indexed series
    pub fn column(&self, column: MetricColumn) -> TimeSeries {
        TimeSeries::from_pairs(self.rows.iter().map(|r| (r.timestamp, column.value(r))))
    }

    pub fn column_by_name(&self, name: &str) -> Option<TimeSeries> {
        MetricColumn::from_name(name).map(|c| self.column(c))
    }

    pub fn mid_prices(&self) -> TimeSeries {
        self.column(MetricColumn::MidPrice)
    }

    pub fn weighted_mid_prices(&self) -> TimeSeries {
        self.column(MetricColumn::WeightedMidPriceAsk)
    }

    pub fn spreads(&self) -> TimeSeries {
        self.column(MetricColumn::Spread)
    }
}

/// Output of a metric extraction run.
///
/// `median_gap_ms` and `level_counts` describe the whole series and are kept
/// outside the per-row table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricExtraction {
    pub table: MetricTable,
    pub median_gap_ms: f64,
    pub level_counts: Vec<usize>,
}

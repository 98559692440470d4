use crate::error::{MicrostructureError, Result};
use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// One row of an order book snapshot.
///
/// Field names follow the exchange dump columns, so a record-oriented book
/// deserializes straight into this struct.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceLevel {
    pub bid_size: f64,
    pub bid: f64,
    pub ask: f64,
    pub ask_size: f64,
}

impl PriceLevel {
    pub fn new(bid_size: f64, bid: f64, ask: f64, ask_size: f64) -> Self {
        Self {
            bid_size,
            bid,
            ask,
            ask_size,
        }
    }
}

/// Point-in-time view of the book, best level first.
///
/// Always holds at least one level. Crossed books (bid above ask) are kept
/// as-is.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OrderBookSnapshot {
    levels: Vec<PriceLevel>,
}

impl OrderBookSnapshot {
    pub fn new(levels: Vec<PriceLevel>) -> Result<Self> {
        if levels.is_empty() {
            return Err(MicrostructureError::insufficient("order book snapshot", 1, 0));
        }
        Ok(Self { levels })
    }

    pub fn levels(&self) -> &[PriceLevel] {
        &self.levels
    }

    /// Top of book
    pub fn best(&self) -> &PriceLevel {
        // non-empty by construction
        &self.levels[0]
    }

    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    /// Sum of bid sizes across all levels (unrounded)
    pub fn bid_depth(&self) -> f64 {
        self.levels.iter().map(|l| l.bid_size).sum()
    }

    /// Sum of ask sizes across all levels (unrounded)
    pub fn ask_depth(&self) -> f64 {
        self.levels.iter().map(|l| l.ask_size).sum()
    }
}

/// Snapshots ordered by timestamp, ascending, with unique timestamps.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SnapshotSeries {
    entries: Vec<(Timestamp, OrderBookSnapshot)>,
}

impl SnapshotSeries {
    /// Build a series from entries in any order.
    ///
    /// Entries are sorted by timestamp; two entries on the same instant are
    /// rejected.
    pub fn new(mut entries: Vec<(Timestamp, OrderBookSnapshot)>) -> Result<Self> {
        entries.sort_by_key(|(ts, _)| *ts);

        if let Some(pair) = entries.windows(2).find(|w| w[0].0 == w[1].0) {
            return Err(MicrostructureError::DuplicateTimestamp(pair[0].0));
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &(Timestamp, OrderBookSnapshot)> {
        self.entries.iter()
    }

    pub fn timestamps(&self) -> impl Iterator<Item = Timestamp> + '_ {
        self.entries.iter().map(|(ts, _)| *ts)
    }

    pub fn first_timestamp(&self) -> Option<Timestamp> {
        self.entries.first().map(|(ts, _)| *ts)
    }

    pub fn last_timestamp(&self) -> Option<Timestamp> {
        self.entries.last().map(|(ts, _)| *ts)
    }
}

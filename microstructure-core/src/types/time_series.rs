use crate::types::Timestamp;
use serde::{Deserialize, Serialize};

/// A single observation of a time-indexed value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub timestamp: Timestamp,
    pub value: f64,
}

/// Values indexed by timestamp, kept in the order they were produced.
///
/// Series built from a `SnapshotSeries` are ascending by construction.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeSeries {
    points: Vec<SeriesPoint>,
}

impl TimeSeries {
    pub fn new(points: Vec<SeriesPoint>) -> Self {
        Self { points }
    }

    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (Timestamp, f64)>,
    {
        Self {
            points: pairs
                .into_iter()
                .map(|(timestamp, value)| SeriesPoint { timestamp, value })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.value).collect()
    }

    pub fn timestamps(&self) -> Vec<Timestamp> {
        self.points.iter().map(|p| p.timestamp).collect()
    }

    /// True when both series are indexed by exactly the same timestamps
    pub fn is_aligned_with(&self, other: &TimeSeries) -> bool {
        self.points.len() == other.points.len()
            && self
                .points
                .iter()
                .zip(other.points.iter())
                .all(|(a, b)| a.timestamp == b.timestamp)
    }
}

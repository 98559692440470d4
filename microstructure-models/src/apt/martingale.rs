use chrono::Timelike;
use microstructure_core::{
    MetricColumn, MetricTable, MicrostructureError, Result, TimeSeries, Timestamp,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Price column a martingale experiment runs on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PriceSource {
    MidPrice,
    /// Ask-side weighted mid-price (`imbalance * mid`)
    WeightedMidPrice,
}

impl PriceSource {
    pub fn column(&self) -> MetricColumn {
        match self {
            PriceSource::MidPrice => MetricColumn::MidPrice,
            PriceSource::WeightedMidPrice => MetricColumn::WeightedMidPriceAsk,
        }
    }

    pub fn series(&self, table: &MetricTable) -> TimeSeries {
        table.column(self.column())
    }

    pub fn label(&self) -> &'static str {
        self.column().name()
    }
}

/// Outcome of comparing each price with the next one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MartingaleEvaluation {
    /// Pairs where the next price equals the current one
    pub successes: usize,
    /// Pairs where the price changed
    pub failures: usize,
    pub total: usize,
    pub success_ratio: f64,
    pub failure_ratio: f64,
}

impl MartingaleEvaluation {
    pub fn report(&self, label: &str) {
        tracing::info!(
            "Martingale [{}]: successes={} ({:.2}), failures={} ({:.2}), total={}",
            label,
            self.successes,
            self.success_ratio,
            self.failures,
            self.failure_ratio,
            self.total
        );
    }
}

/// UTC hour and minute of a timestamp.
///
/// The date is not part of the key, so 13:06 on two different days lands in
/// the same bucket. Snapshot keys carrying an offset are normalised to UTC
/// when loaded, so `13:06:00+02:00` buckets as `11:06`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MinuteBucket {
    pub hour: u32,
    pub minute: u32,
}

impl MinuteBucket {
    pub fn of(timestamp: &Timestamp) -> Self {
        Self {
            hour: timestamp.hour(),
            minute: timestamp.minute(),
        }
    }
}

impl fmt::Display for MinuteBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

/// Martingale counts inside one minute bucket.
///
/// Ratios are `None` for a bucket holding a single price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BucketEvaluation {
    pub bucket: MinuteBucket,
    pub successes: usize,
    pub failures: usize,
    pub total: usize,
    pub success_ratio: Option<f64>,
    pub failure_ratio: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinuteSummary {
    pub buckets: usize,
    pub total_pairs: usize,
    /// Mean over buckets with a defined ratio
    pub mean_success_ratio: Option<f64>,
    pub mean_failure_ratio: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MinuteMartingaleEvaluation {
    /// Buckets in first-seen order
    pub buckets: Vec<BucketEvaluation>,
    pub summary: MinuteSummary,
}

impl MinuteMartingaleEvaluation {
    pub fn report(&self, label: &str) {
        tracing::info!(
            "Martingale by minute [{}]: buckets={}, pairs={}, mean success ratio={:?}, mean failure ratio={:?}",
            label,
            self.summary.buckets,
            self.summary.total_pairs,
            self.summary.mean_success_ratio,
            self.summary.mean_failure_ratio
        );

        for b in &self.buckets {
            tracing::debug!(
                "  {}: successes={}, failures={}, total={}, ratios={:?}/{:?}",
                b.bucket,
                b.successes,
                b.failures,
                b.total,
                b.success_ratio,
                b.failure_ratio
            );
        }
    }
}

/// A price next to the price that followed it
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceTransition {
    pub timestamp: Timestamp,
    pub price: f64,
    pub next_price: f64,
}

/// Count unchanged and changed adjacent pairs
fn count_pairs(values: &[f64]) -> (usize, usize) {
    values.windows(2).fold((0, 0), |(same, changed), w| {
        if w[0] == w[1] {
            (same + 1, changed)
        } else {
            (same, changed + 1)
        }
    })
}

/// Whole-series martingale test: is each price equal to the next one?
pub fn evaluate_martingale(prices: &TimeSeries) -> Result<MartingaleEvaluation> {
    if prices.len() < 2 {
        return Err(MicrostructureError::insufficient(
            "martingale evaluation",
            2,
            prices.len(),
        ));
    }

    let (successes, failures) = count_pairs(&prices.values());
    let total = prices.len() - 1;

    Ok(MartingaleEvaluation {
        successes,
        failures,
        total,
        success_ratio: successes as f64 / total as f64,
        failure_ratio: failures as f64 / total as f64,
    })
}

/// Group prices by `(hour, minute)`, keeping first-seen bucket order and the
/// original order inside each bucket.
pub fn bucket_by_minute(prices: &TimeSeries) -> Vec<(MinuteBucket, Vec<f64>)> {
    let mut order: Vec<MinuteBucket> = Vec::new();
    let mut groups: HashMap<MinuteBucket, Vec<f64>> = HashMap::new();

    for point in prices.points() {
        let key = MinuteBucket::of(&point.timestamp);
        groups
            .entry(key)
            .or_insert_with(|| {
                order.push(key);
                Vec::new()
            })
            .push(point.value);
    }

    order
        .into_iter()
        .map(|key| {
            let values = groups.remove(&key).unwrap_or_default();
            (key, values)
        })
        .collect()
}

/// Martingale test run separately inside each minute bucket.
///
/// Pairs never cross a bucket boundary.
pub fn evaluate_martingale_by_minute(prices: &TimeSeries) -> Result<MinuteMartingaleEvaluation> {
    if prices.len() < 2 {
        return Err(MicrostructureError::insufficient(
            "minute martingale evaluation",
            2,
            prices.len(),
        ));
    }

    let buckets: Vec<BucketEvaluation> = bucket_by_minute(prices)
        .into_iter()
        .map(|(bucket, values)| {
            let (successes, failures) = count_pairs(&values);
            let total = values.len().saturating_sub(1);
            let ratio = |count: usize| (total > 0).then(|| count as f64 / total as f64);

            BucketEvaluation {
                bucket,
                successes,
                failures,
                total,
                success_ratio: ratio(successes),
                failure_ratio: ratio(failures),
            }
        })
        .collect();

    let mean_defined = |ratios: Vec<f64>| {
        if ratios.is_empty() {
            None
        } else {
            Some(ratios.iter().sum::<f64>() / ratios.len() as f64)
        }
    };

    let summary = MinuteSummary {
        buckets: buckets.len(),
        total_pairs: buckets.iter().map(|b| b.total).sum(),
        mean_success_ratio: mean_defined(buckets.iter().filter_map(|b| b.success_ratio).collect()),
        mean_failure_ratio: mean_defined(buckets.iter().filter_map(|b| b.failure_ratio).collect()),
    };

    Ok(MinuteMartingaleEvaluation { buckets, summary })
}

pub fn evaluate_mid_price_martingale(table: &MetricTable) -> Result<MartingaleEvaluation> {
    evaluate_martingale(&PriceSource::MidPrice.series(table))
}

pub fn evaluate_mid_price_martingale_by_minute(
    table: &MetricTable,
) -> Result<MinuteMartingaleEvaluation> {
    evaluate_martingale_by_minute(&PriceSource::MidPrice.series(table))
}

/// Whole-series test on the ask-weighted mid-price
pub fn evaluate_weighted_martingale(table: &MetricTable) -> Result<MartingaleEvaluation> {
    evaluate_martingale(&PriceSource::WeightedMidPrice.series(table))
}

/// Minute-bucketed test on the ask-weighted mid-price
pub fn evaluate_weighted_martingale_by_minute(
    table: &MetricTable,
) -> Result<MinuteMartingaleEvaluation> {
    evaluate_martingale_by_minute(&PriceSource::WeightedMidPrice.series(table))
}

/// Each price paired with the next one; the last price has no successor
pub fn price_transitions(prices: &TimeSeries) -> Vec<PriceTransition> {
    prices
        .points()
        .windows(2)
        .map(|w| PriceTransition {
            timestamp: w[0].timestamp,
            price: w[0].value,
            next_price: w[1].value,
        })
        .collect()
}

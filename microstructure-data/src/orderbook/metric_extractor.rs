use microstructure_core::stats::{median, round_to};
use microstructure_core::{
    MetricExtraction, MetricRow, MetricTable, MicrostructureError, OrderBookSnapshot, Result,
    SnapshotSeries, Timestamp,
};
use tracing;

/// Decimal places kept on aggregated volumes and VWAP
pub const VOLUME_DECIMALS: i32 = 6;

/// Compute per-snapshot metrics plus the series-wide median gap and level
/// counts.
///
/// Requires at least two snapshots. Each row depends only on its own snapshot;
/// a zero total volume anywhere fails the whole extraction.
pub fn extract_metrics(series: &SnapshotSeries) -> Result<MetricExtraction> {
    if series.len() < 2 {
        return Err(MicrostructureError::insufficient(
            "metric extraction",
            2,
            series.len(),
        ));
    }

    let rows = series
        .iter()
        .map(|(timestamp, snapshot)| metric_row(*timestamp, snapshot))
        .collect::<Result<Vec<_>>>()?;

    let level_counts: Vec<usize> = series.iter().map(|(_, s)| s.level_count()).collect();
    let median_gap_ms = median_gap_ms(series)?;

    tracing::debug!(
        "Extracted metrics for {} snapshots: median gap {:.3}ms, levels {}..{}",
        rows.len(),
        median_gap_ms,
        level_counts.iter().min().copied().unwrap_or(0),
        level_counts.iter().max().copied().unwrap_or(0)
    );

    Ok(MetricExtraction {
        table: MetricTable::new(rows),
        median_gap_ms,
        level_counts,
    })
}

/// Metrics for one snapshot
pub fn metric_row(timestamp: Timestamp, snapshot: &OrderBookSnapshot) -> Result<MetricRow> {
    let best = snapshot.best();
    let bid = best.bid;
    let ask = best.ask;

    let raw_bid = snapshot.bid_depth();
    let raw_ask = snapshot.ask_depth();
    let bid_volume = round_to(raw_bid, VOLUME_DECIMALS);
    let ask_volume = round_to(raw_ask, VOLUME_DECIMALS);
    let total_volume = round_to(raw_bid + raw_ask, VOLUME_DECIMALS);

    if total_volume == 0.0 {
        return Err(MicrostructureError::DivisionByZero {
            timestamp,
            quantity: "imbalance",
        });
    }

    let spread = ask - bid;
    let mid_price = (ask + bid) * 0.5;
    let imbalance = bid_volume / total_volume;

    // The bid-weighted mid and VWAP divide by the sum of the rounded sides,
    // which can differ from the rounded total in the last decimal.
    let side_sum = bid_volume + ask_volume;
    if side_sum == 0.0 {
        return Err(MicrostructureError::DivisionByZero {
            timestamp,
            quantity: "vwap",
        });
    }

    let weighted_mid_price_ask = imbalance * mid_price;
    let weighted_mid_price_bid = (ask_volume / side_sum) * bid + imbalance * ask;
    let vwap = round_to((bid * bid_volume + ask * ask_volume) / side_sum, VOLUME_DECIMALS);

    Ok(MetricRow {
        timestamp,
        spread,
        mid_price,
        bid_volume,
        ask_volume,
        total_volume,
        imbalance,
        weighted_mid_price_ask,
        weighted_mid_price_bid,
        vwap,
    })
}

/// Median of consecutive timestamp gaps in milliseconds
fn median_gap_ms(series: &SnapshotSeries) -> Result<f64> {
    let timestamps: Vec<Timestamp> = series.timestamps().collect();

    let gaps: Vec<f64> = timestamps
        .windows(2)
        .map(|w| {
            let delta = w[1] - w[0];
            match delta.num_microseconds() {
                Some(us) => us as f64 / 1_000.0,
                None => delta.num_milliseconds() as f64,
            }
        })
        .collect();

    median(&gaps).ok_or_else(|| MicrostructureError::insufficient("median gap", 2, series.len()))
}

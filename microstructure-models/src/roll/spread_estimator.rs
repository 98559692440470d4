//! Roll (1984) effective spread estimator.
//!
//! Bid-ask bounce makes consecutive price changes negatively autocorrelated.
//! With `cov = Cov(ΔP_t, ΔP_{t-1})` the half-spread is `C = sqrt(-cov)` and the
//! full spread `2C`. A non-negative covariance leaves the estimator undefined
//! and is reported as `InvalidEstimate`.

use microstructure_core::stats::{mean, sample_covariance, sample_variance};
use microstructure_core::{MicrostructureError, Result, TimeSeries, Timestamp};
use serde::{Deserialize, Serialize};

/// Minimum prices giving two overlapping (ΔP_t, ΔP_{t-1}) pairs
pub const MIN_ROLL_PRICES: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollEstimate {
    /// Lag-1 sample autocovariance of price changes
    pub covariance: f64,
    /// `C = sqrt(-covariance)`
    pub half_spread: f64,
    /// `2C`, used as the constant estimated spread
    pub estimated_spread: f64,
    /// Number of (ΔP_t, ΔP_{t-1}) pairs the covariance was taken over
    pub pairs: usize,
}

/// Observed versus estimated quotes at one timestamp.
///
/// Both quote pairs are offset from the mid-price by a full spread, not a
/// half-spread.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollComparisonRow {
    pub timestamp: Timestamp,
    pub observed_spread: f64,
    pub estimated_spread: f64,
    pub observed_bid: f64,
    pub observed_ask: f64,
    pub theoretical_bid: f64,
    pub theoretical_ask: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RollSummary {
    pub mean_observed_spread: f64,
    /// Sample variance (n - 1)
    pub observed_spread_variance: f64,
    pub estimated_spread: f64,
    /// `mean_observed_spread - estimated_spread`
    pub difference: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RollAnalysis {
    pub estimate: RollEstimate,
    pub comparison: Vec<RollComparisonRow>,
    pub summary: RollSummary,
}

impl RollAnalysis {
    pub fn report(&self) {
        tracing::info!(
            "Roll model: cov={:.8}, C={:.6}, estimated spread={:.6}, mean observed spread={:.6}, variance={:.6}, difference={:.6}",
            self.estimate.covariance,
            self.estimate.half_spread,
            self.estimate.estimated_spread,
            self.summary.mean_observed_spread,
            self.summary.observed_spread_variance,
            self.summary.difference
        );
    }
}

/// First differences `P_t - P_{t-1}`
fn first_differences(values: &[f64]) -> Vec<f64> {
    values.windows(2).map(|w| w[1] - w[0]).collect()
}

/// Lag-1 autocovariance of price changes over the overlapping defined pairs.
///
/// Returns the covariance and the pair count.
pub fn price_change_autocovariance(prices: &TimeSeries) -> Result<(f64, usize)> {
    if prices.len() < MIN_ROLL_PRICES {
        return Err(MicrostructureError::insufficient(
            "Roll autocovariance",
            MIN_ROLL_PRICES,
            prices.len(),
        ));
    }

    let deltas = first_differences(&prices.values());
    // deltas[1..] is ΔP_t, deltas[..n-1] the same changes one step earlier
    let current = &deltas[1..];
    let lagged = &deltas[..deltas.len() - 1];

    let covariance = sample_covariance(current, lagged).ok_or_else(|| {
        MicrostructureError::insufficient("Roll autocovariance", MIN_ROLL_PRICES, prices.len())
    })?;

    Ok((covariance, current.len()))
}

/// Closed-form Roll estimate from a price series
pub fn roll_estimate(prices: &TimeSeries) -> Result<RollEstimate> {
    let (covariance, pairs) = price_change_autocovariance(prices)?;

    if !covariance.is_finite() || covariance >= 0.0 {
        return Err(MicrostructureError::InvalidEstimate { covariance });
    }

    let half_spread = (-covariance).sqrt();

    Ok(RollEstimate {
        covariance,
        half_spread,
        estimated_spread: 2.0 * half_spread,
        pairs,
    })
}

/// Estimate the spread from mid-price dynamics and compare it with the
/// observed spread on the same timestamps.
pub fn estimate_roll_spread(
    mid_prices: &TimeSeries,
    observed_spread: &TimeSeries,
) -> Result<RollAnalysis> {
    if !mid_prices.is_aligned_with(observed_spread) {
        return Err(MicrostructureError::SeriesMismatch {
            left: mid_prices.len(),
            right: observed_spread.len(),
        });
    }

    let estimate = roll_estimate(mid_prices)?;
    let estimated_spread = estimate.estimated_spread;

    let comparison: Vec<RollComparisonRow> = mid_prices
        .points()
        .iter()
        .zip(observed_spread.points())
        .map(|(mid, spread)| RollComparisonRow {
            timestamp: mid.timestamp,
            observed_spread: spread.value,
            estimated_spread,
            observed_bid: mid.value - spread.value,
            observed_ask: mid.value + spread.value,
            theoretical_bid: mid.value - estimated_spread,
            theoretical_ask: mid.value + estimated_spread,
        })
        .collect();

    let spreads = observed_spread.values();
    let too_short =
        || MicrostructureError::insufficient("Roll summary", MIN_ROLL_PRICES, spreads.len());
    let mean_observed_spread = mean(&spreads).ok_or_else(too_short)?;
    let observed_spread_variance = sample_variance(&spreads).ok_or_else(too_short)?;

    Ok(RollAnalysis {
        estimate,
        comparison,
        summary: RollSummary {
            mean_observed_spread,
            observed_spread_variance,
            estimated_spread,
            difference: mean_observed_spread - estimated_spread,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};

    fn series(values: &[f64]) -> TimeSeries {
        let start = Utc.with_ymd_and_hms(2021, 7, 5, 13, 0, 0).unwrap();
        TimeSeries::from_pairs(
            values
                .iter()
                .enumerate()
                .map(|(i, v)| (start + Duration::milliseconds(i as i64 * 100), *v)),
        )
    }

    #[test]
    fn test_bid_ask_bounce_recovers_spread() {
        // changes alternate -2, +2: lagged covariance is -16/3 over 4 pairs
        let prices = series(&[101.0, 99.0, 101.0, 99.0, 101.0, 99.0]);
        let estimate = roll_estimate(&prices).unwrap();

        assert_eq!(estimate.pairs, 4);
        assert!((estimate.covariance + 16.0 / 3.0).abs() < 1e-12);
        assert!((estimate.half_spread - (16.0f64 / 3.0).sqrt()).abs() < 1e-12);
        assert!((estimate.estimated_spread - 2.0 * estimate.half_spread).abs() < 1e-12);
    }

    #[test]
    fn test_constant_trend_is_invalid() {
        let err = roll_estimate(&series(&[100.0, 101.0, 102.0, 103.0, 104.0])).unwrap_err();
        assert_eq!(err, MicrostructureError::InvalidEstimate { covariance: 0.0 });
    }

    #[test]
    fn test_positive_autocovariance_is_invalid() {
        // changes 1, 2, 3, 4: current [2, 3, 4] vs lagged [1, 2, 3] -> cov 1
        let err = roll_estimate(&series(&[100.0, 101.0, 103.0, 106.0, 110.0])).unwrap_err();
        match err {
            MicrostructureError::InvalidEstimate { covariance } => {
                assert!((covariance - 1.0).abs() < 1e-12)
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_too_few_prices() {
        let err = roll_estimate(&series(&[100.0, 101.0, 100.0])).unwrap_err();
        assert_eq!(
            err,
            MicrostructureError::insufficient("Roll autocovariance", MIN_ROLL_PRICES, 3)
        );
    }

    #[test]
    fn test_misaligned_inputs() {
        let mids = series(&[101.0, 99.0, 101.0, 99.0]);
        let spreads = series(&[2.0, 2.0, 2.0]);
        let err = estimate_roll_spread(&mids, &spreads).unwrap_err();
        assert_eq!(err, MicrostructureError::SeriesMismatch { left: 4, right: 3 });
    }

    #[test]
    fn test_comparison_table_and_summary() {
        let mids = series(&[101.0, 99.0, 101.0, 99.0, 101.0, 99.0]);
        let spreads = series(&[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);

        let analysis = estimate_roll_spread(&mids, &spreads).unwrap();
        let estimated = analysis.estimate.estimated_spread;

        assert_eq!(analysis.comparison.len(), 6);
        let first = analysis.comparison[0];
        assert_eq!(first.observed_spread, 1.0);
        assert_eq!(first.estimated_spread, estimated);
        assert_eq!(first.observed_bid, 100.0);
        assert_eq!(first.observed_ask, 102.0);
        assert_eq!(first.theoretical_bid, 101.0 - estimated);
        assert_eq!(first.theoretical_ask, 101.0 + estimated);
        assert!(analysis
            .comparison
            .iter()
            .all(|row| row.estimated_spread == estimated));

        assert_eq!(analysis.summary.mean_observed_spread, 2.0);
        // deviations -1, 0, 1, -1, 0, 1 -> 4 / 5
        assert!((analysis.summary.observed_spread_variance - 0.8).abs() < 1e-12);
        assert_eq!(analysis.summary.estimated_spread, estimated);
        assert_eq!(analysis.summary.difference, 2.0 - estimated);
    }
}

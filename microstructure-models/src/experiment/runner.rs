use microstructure_core::{
    MetricExtraction, MetricTable, MicrostructureError, Result, SnapshotSeries,
};
use microstructure_data::extract_metrics;
use serde::{Deserialize, Serialize};

use crate::apt::{
    evaluate_martingale, evaluate_martingale_by_minute, price_transitions, MartingaleEvaluation,
    MinuteMartingaleEvaluation, PriceSource, PriceTransition,
};
use crate::roll::{estimate_roll_spread, RollAnalysis};

/// Which experiments a run includes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentConfig {
    /// Price columns the martingale test runs on, in order
    pub price_sources: Vec<PriceSource>,

    /// Run the Roll spread estimator
    pub roll_enabled: bool,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            price_sources: vec![PriceSource::MidPrice, PriceSource::WeightedMidPrice],
            roll_enabled: true,
        }
    }
}

/// Martingale results for one price column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MartingaleExperiment {
    pub source: PriceSource,
    pub whole_series: MartingaleEvaluation,
    pub by_minute: MinuteMartingaleEvaluation,
    pub transitions: Vec<PriceTransition>,
}

/// Roll estimator outcome.
///
/// A non-negative autocovariance is a legitimate finding for the dataset, so
/// it is recorded rather than aborting the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RollOutcome {
    Valid(RollAnalysis),
    Invalid { covariance: f64 },
    Skipped,
}

/// Everything a run produced, ready for serialization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub snapshots: usize,
    pub median_gap_ms: f64,
    pub level_counts: Vec<usize>,
    pub metrics: MetricTable,
    pub martingale: Vec<MartingaleExperiment>,
    pub roll: RollOutcome,
}

/// Runs the martingale and Roll experiments over one snapshot series
pub struct ExperimentRunner {
    config: ExperimentConfig,
}

impl ExperimentRunner {
    pub fn new(config: ExperimentConfig) -> Self {
        tracing::info!(
            "Initializing experiment runner: sources={:?}, roll_enabled={}",
            config.price_sources,
            config.roll_enabled
        );

        Self { config }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    /// Extract metrics from the series, then run every configured experiment
    pub fn run(&self, series: &SnapshotSeries) -> Result<ExperimentReport> {
        let extraction = extract_metrics(series)?;

        tracing::info!(
            "Metrics extracted: {} rows, median gap {:.3}ms",
            extraction.table.len(),
            extraction.median_gap_ms
        );

        self.run_on_metrics(extraction)
    }

    /// Run every configured experiment on already extracted metrics
    pub fn run_on_metrics(&self, extraction: MetricExtraction) -> Result<ExperimentReport> {
        let MetricExtraction {
            table,
            median_gap_ms,
            level_counts,
        } = extraction;

        let martingale = self
            .config
            .price_sources
            .iter()
            .map(|source| run_martingale(&table, *source))
            .collect::<Result<Vec<_>>>()?;

        let roll = if self.config.roll_enabled {
            run_roll(&table)?
        } else {
            tracing::info!("Roll estimator disabled");
            RollOutcome::Skipped
        };

        Ok(ExperimentReport {
            snapshots: table.len(),
            median_gap_ms,
            level_counts,
            metrics: table,
            martingale,
            roll,
        })
    }
}

fn run_martingale(table: &MetricTable, source: PriceSource) -> Result<MartingaleExperiment> {
    let prices = source.series(table);

    let whole_series = evaluate_martingale(&prices)?;
    whole_series.report(source.label());

    let by_minute = evaluate_martingale_by_minute(&prices)?;
    by_minute.report(source.label());

    Ok(MartingaleExperiment {
        source,
        whole_series,
        by_minute,
        transitions: price_transitions(&prices),
    })
}

/// Only `InvalidEstimate` is folded into the outcome; every other failure
/// propagates.
fn run_roll(table: &MetricTable) -> Result<RollOutcome> {
    match estimate_roll_spread(&table.mid_prices(), &table.spreads()) {
        Ok(analysis) => {
            analysis.report();
            Ok(RollOutcome::Valid(analysis))
        }
        Err(MicrostructureError::InvalidEstimate { covariance }) => {
            tracing::warn!(
                "Roll estimate invalid: price change autocovariance {} is not negative",
                covariance
            );
            Ok(RollOutcome::Invalid { covariance })
        }
        Err(e) => Err(e),
    }
}

mod config;

use anyhow::{Context, Result};
use clap::Parser;
use microstructure_core::stats::mean;
use microstructure_core::{MetricColumn, MetricTable};
use microstructure_data::{load_orderbooks, DEFAULT_EXCHANGE};
use microstructure_models::{ExperimentConfig, ExperimentReport, ExperimentRunner, RollOutcome};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::AnalysisConfig;

/// Order Book Microstructure Lab
///
/// Loads order book snapshots for one exchange, extracts microstructure
/// metrics and evaluates the martingale and Roll spread hypotheses on them.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Order book JSON file
    #[arg(short, long, default_value = config::DEFAULT_INPUT)]
    input: PathBuf,

    /// Exchange key inside the order book file
    #[arg(short, long, default_value = DEFAULT_EXCHANGE)]
    exchange: String,

    /// Write every result table as a JSON report to this path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Skip the Roll spread estimator
    #[arg(long)]
    no_roll: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short = 'l', long, default_value = "info")]
    log_level: String,
}

impl Args {
    /// Parse log level from string
    fn parse_log_level(&self) -> Level {
        match self.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        }
    }

    fn into_config(self) -> AnalysisConfig {
        AnalysisConfig {
            input_path: self.input,
            exchange: self.exchange,
            output_path: self.output,
            roll_enabled: !self.no_roll,
        }
    }
}

fn init_logging(level: Level) {
    let level = level.to_string().to_lowercase();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "microstructure_lab={},microstructure_data={},microstructure_models={}",
                level, level, level
            ))
        }))
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .init();
}

fn log_metric_summary(table: &MetricTable) {
    info!("Metric averages over {} snapshots:", table.len());
    for column in MetricColumn::ALL {
        if let Some(avg) = mean(&table.column(column).values()) {
            info!("  {}: {:.6}", column.name(), avg);
        }
    }
}

fn write_report(path: &Path, report: &ExperimentReport) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("Failed to create report file {}", path.display()))?;
    write_report_to(BufWriter::new(file), report)
}

fn write_report_to<W: Write>(mut writer: W, report: &ExperimentReport) -> Result<()> {
    serde_json::to_writer_pretty(&mut writer, report)
        .context("Failed to serialize experiment report")?;
    writer.flush().context("Failed to flush experiment report")?;
    Ok(())
}

fn run(config: &AnalysisConfig) -> Result<ExperimentReport> {
    let series = load_orderbooks(&config.input_path, &config.exchange)?;

    let runner = ExperimentRunner::new(ExperimentConfig {
        roll_enabled: config.roll_enabled,
        ..Default::default()
    });
    let report = runner.run(&series).context("Experiment run failed")?;

    info!("");
    info!("Median time between snapshots: {:.3}ms", report.median_gap_ms);
    info!(
        "Price levels per snapshot: min={}, max={}",
        report.level_counts.iter().min().copied().unwrap_or(0),
        report.level_counts.iter().max().copied().unwrap_or(0)
    );
    log_metric_summary(&report.metrics);

    Ok(report)
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.parse_log_level());
    let config = args.into_config();

    info!("📈 Order Book Microstructure Lab");
    info!("================================");
    info!("Configuration:");
    info!("  Input: {}", config.input_path.display());
    info!("  Exchange: {}", config.exchange);
    info!("  Roll estimator: {}", config.roll_enabled);
    info!("");

    let report = run(&config)?;

    if let RollOutcome::Invalid { covariance } = report.roll {
        info!(
            "Roll model not applicable to this sample (autocovariance {:.8})",
            covariance
        );
    }

    if let Some(path) = &config.output_path {
        write_report(path, &report)?;
        info!("Report written to {}", path.display());
    }

    info!("✅ Analysis complete");
    Ok(())
}

use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, NaiveDateTime, Utc};
use microstructure_core::{OrderBookSnapshot, PriceLevel, SnapshotSeries, Timestamp};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use tracing;

/// Exchange selected when none is given
pub const DEFAULT_EXCHANGE: &str = "bitfinex";

/// Naive timestamp layouts accepted after RFC 3339 fails; interpreted as UTC
const NAIVE_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// One book as it appears in the dump: either a list of level records or
/// one array/index-map per column (the pandas `to_dict()` layout).
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawBook {
    Records(Vec<PriceLevel>),
    Columns(RawColumns),
}

#[derive(Debug, Deserialize)]
struct RawColumns {
    bid_size: RawColumn,
    bid: RawColumn,
    ask: RawColumn,
    ask_size: RawColumn,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawColumn {
    List(Vec<f64>),
    Indexed(BTreeMap<String, f64>),
}

impl RawColumn {
    /// Values in row order. Index maps are ordered by numeric row index,
    /// not by key string.
    fn into_values(self, name: &str) -> Result<Vec<f64>> {
        match self {
            RawColumn::List(values) => Ok(values),
            RawColumn::Indexed(map) => {
                let mut indexed = map
                    .into_iter()
                    .map(|(key, value)| {
                        key.parse::<usize>()
                            .map(|idx| (idx, value))
                            .with_context(|| format!("Non-numeric row index '{}' in column {}", key, name))
                    })
                    .collect::<Result<Vec<_>>>()?;
                indexed.sort_by_key(|(idx, _)| *idx);
                Ok(indexed.into_iter().map(|(_, value)| value).collect())
            }
        }
    }
}

impl RawBook {
    fn into_levels(self) -> Result<Vec<PriceLevel>> {
        match self {
            RawBook::Records(levels) => Ok(levels),
            RawBook::Columns(columns) => {
                let bid_size = columns.bid_size.into_values("bid_size")?;
                let bid = columns.bid.into_values("bid")?;
                let ask = columns.ask.into_values("ask")?;
                let ask_size = columns.ask_size.into_values("ask_size")?;

                let rows = bid_size.len();
                if bid.len() != rows || ask.len() != rows || ask_size.len() != rows {
                    bail!(
                        "Column lengths differ: bid_size={}, bid={}, ask={}, ask_size={}",
                        rows,
                        bid.len(),
                        ask.len(),
                        ask_size.len()
                    );
                }

                Ok((0..rows)
                    .map(|i| PriceLevel::new(bid_size[i], bid[i], ask[i], ask_size[i]))
                    .collect())
            }
        }
    }
}

/// Parse a snapshot timestamp key.
///
/// Accepts RFC 3339 (`2021-07-05T13:06:46.571Z`) and naive
/// `YYYY-MM-DD[T ]HH:MM:SS[.fff]`, the latter read as UTC.
pub fn parse_timestamp(raw: &str) -> Result<Timestamp> {
    let trimmed = raw.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(dt.with_timezone(&Utc));
    }

    for format in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    Err(anyhow!("Unrecognized timestamp format: '{}'", raw))
}

/// Parse a multi-exchange order book dump and keep one exchange.
///
/// Null books are dropped; the rest are converted to snapshots and ordered by
/// timestamp.
pub fn parse_orderbooks(json: &str, exchange: &str) -> Result<SnapshotSeries> {
    let document: Value = serde_json::from_str(json).context("Failed to parse order book JSON")?;

    let books = document
        .get(exchange)
        .ok_or_else(|| anyhow!("Exchange '{}' not found in order book file", exchange))?
        .as_object()
        .ok_or_else(|| anyhow!("Exchange '{}' entry is not a timestamp map", exchange))?;

    let mut entries = Vec::with_capacity(books.len());
    let mut dropped = 0usize;

    for (key, value) in books {
        if value.is_null() {
            dropped += 1;
            continue;
        }

        let timestamp = parse_timestamp(key)?;
        let raw: RawBook = serde_json::from_value(value.clone())
            .with_context(|| format!("Malformed order book at {}", key))?;
        let levels = raw
            .into_levels()
            .with_context(|| format!("Malformed order book at {}", key))?;
        let snapshot = OrderBookSnapshot::new(levels)
            .with_context(|| format!("Empty order book at {}", key))?;

        entries.push((timestamp, snapshot));
    }

    if dropped > 0 {
        tracing::debug!("Dropped {} null order books for {}", dropped, exchange);
    }

    let series = SnapshotSeries::new(entries).context("Invalid snapshot series")?;

    tracing::info!(
        "Loaded {} order book snapshots for {} ({:?} to {:?})",
        series.len(),
        exchange,
        series.first_timestamp(),
        series.last_timestamp()
    );

    Ok(series)
}

/// Read an order book dump from disk and keep one exchange
pub fn load_orderbooks<P: AsRef<Path>>(path: P, exchange: &str) -> Result<SnapshotSeries> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(anyhow!("Order book file does not exist: {}", path.display()));
    }

    tracing::info!("Reading order books from: {}", path.display());

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read order book file {}", path.display()))?;

    parse_orderbooks(&json, exchange)
}

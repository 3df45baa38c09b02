//! Bar sources — CSV loading and seeded synthetic series.
//!
//! The loader enforces the bar-source contract up front: OHLC sanity and
//! strictly increasing timestamps. Violations are fatal, not recoverable.

use chrono::{NaiveDate, NaiveDateTime};
use hypolab_core::domain::Bar;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("bar {index} is malformed (OHLC invariant violated) at {timestamp}")]
    MalformedBar {
        index: usize,
        timestamp: NaiveDateTime,
    },
    #[error("bars are not in chronological order at row {index}: {previous} -> {timestamp}")]
    OutOfOrder {
        index: usize,
        previous: NaiveDateTime,
        timestamp: NaiveDateTime,
    },
    #[error("no bars found")]
    Empty,
}

#[derive(Debug, Deserialize)]
struct CsvBar {
    timestamp: NaiveDateTime,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl From<CsvBar> for Bar {
    fn from(row: CsvBar) -> Self {
        Bar {
            timestamp: row.timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume,
        }
    }
}

/// Load a bar series from a CSV file with a
/// `timestamp,open,high,low,close,volume` header.
pub fn load_bars_csv(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let mut reader = csv::Reader::from_path(path)?;
    let mut bars = Vec::new();
    for row in reader.deserialize::<CsvBar>() {
        bars.push(Bar::from(row?));
    }
    validate_bars(&bars)?;
    Ok(bars)
}

/// Write a bar series as CSV (inverse of [`load_bars_csv`]).
pub fn write_bars_csv(path: &Path, bars: &[Bar]) -> Result<(), LoadError> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for bar in bars {
        writer.write_record([
            bar.timestamp.format("%Y-%m-%dT%H:%M:%S").to_string(),
            bar.open.to_string(),
            bar.high.to_string(),
            bar.low.to_string(),
            bar.close.to_string(),
            bar.volume.to_string(),
        ])?;
    }
    writer.flush()?;
    Ok(())
}

/// Validate the bar-source contract: non-empty, sane OHLC, strictly
/// increasing timestamps.
pub fn validate_bars(bars: &[Bar]) -> Result<(), LoadError> {
    if bars.is_empty() {
        return Err(LoadError::Empty);
    }
    for (index, bar) in bars.iter().enumerate() {
        if !bar.is_sane() {
            return Err(LoadError::MalformedBar {
                index,
                timestamp: bar.timestamp,
            });
        }
        if index > 0 && bar.timestamp <= bars[index - 1].timestamp {
            return Err(LoadError::OutOfOrder {
                index,
                previous: bars[index - 1].timestamp,
                timestamp: bar.timestamp,
            });
        }
    }
    Ok(())
}

/// Deterministic synthetic random-walk series.
///
/// Seeded `StdRng` keeps the series reproducible: same seed, same bars,
/// regardless of platform. Daily cadence starting 2015-01-02.
pub fn synthetic_bars(seed: u64, n: usize, start_price: f64) -> Vec<Bar> {
    let mut rng = StdRng::seed_from_u64(seed);
    let base = NaiveDate::from_ymd_opt(2015, 1, 2)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let mut price = start_price.max(1.0);
    (0..n)
        .map(|i| {
            let drift = 0.0002;
            let shock: f64 = rng.gen_range(-0.02..0.02);
            let open = price;
            price = (price * (1.0 + drift + shock)).max(1.0);
            let close = price;
            let wick: f64 = rng.gen_range(0.0..0.01);
            Bar {
                timestamp: base + chrono::Duration::days(i as i64),
                open,
                high: open.max(close) * (1.0 + wick),
                low: (open.min(close) * (1.0 - wick)).max(0.5),
                close,
                volume: rng.gen_range(10_000.0f64..1_000_000.0).round(),
            }
        })
        .collect()
}

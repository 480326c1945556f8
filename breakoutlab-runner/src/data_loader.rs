//! CSV loading of bars and raw ticks.
//!
//! Timestamps are epoch milliseconds in the input files, matching the raw
//! trade exports this engine was built against. Bars are sanity-checked
//! row by row; ordering is re-validated by the engine, but a malformed
//! OHLC row fails here with its line number.

use breakoutlab_core::domain::Bar;
use breakoutlab_core::resample::Tick;
use chrono::{TimeZone, Utc};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Errors from the data loading layer.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: csv::Error,
    },

    #[error("row {row} of {path}: timestamp {timestamp_ms} ms is not representable")]
    BadTimestamp {
        path: String,
        row: usize,
        timestamp_ms: i64,
    },

    #[error("row {row} of {path}: OHLC values are not sane (high/low do not bound open/close)")]
    InsaneBar { path: String, row: usize },
}

#[derive(Debug, Deserialize)]
struct BarRecord {
    timestamp_ms: i64,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

#[derive(Debug, Deserialize)]
struct TickRecord {
    timestamp_ms: i64,
    price: f64,
    volume: f64,
}

/// Load OHLCV bars from a CSV with columns
/// `timestamp_ms,open,high,low,close,volume`.
pub fn load_bars(path: &Path) -> Result<Vec<Bar>, LoadError> {
    let display = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Read {
        path: display.clone(),
        source,
    })?;

    let mut bars = Vec::new();
    for (row, record) in reader.deserialize::<BarRecord>().enumerate() {
        let record = record.map_err(|source| LoadError::Read {
            path: display.clone(),
            source,
        })?;
        let timestamp = Utc
            .timestamp_millis_opt(record.timestamp_ms)
            .single()
            .ok_or(LoadError::BadTimestamp {
                path: display.clone(),
                row,
                timestamp_ms: record.timestamp_ms,
            })?;
        let bar = Bar {
            timestamp,
            open: record.open,
            high: record.high,
            low: record.low,
            close: record.close,
            volume: record.volume,
        };
        if !bar.is_sane() {
            return Err(LoadError::InsaneBar { path: display, row });
        }
        bars.push(bar);
    }
    Ok(bars)
}

/// Load raw trade ticks from a CSV with columns `timestamp_ms,price,volume`.
pub fn load_ticks(path: &Path) -> Result<Vec<Tick>, LoadError> {
    let display = path.display().to_string();
    let mut reader = csv::Reader::from_path(path).map_err(|source| LoadError::Read {
        path: display.clone(),
        source,
    })?;

    let mut ticks = Vec::new();
    for (row, record) in reader.deserialize::<TickRecord>().enumerate() {
        let record = record.map_err(|source| LoadError::Read {
            path: display.clone(),
            source,
        })?;
        let timestamp = Utc
            .timestamp_millis_opt(record.timestamp_ms)
            .single()
            .ok_or(LoadError::BadTimestamp {
                path: display.clone(),
                row,
                timestamp_ms: record.timestamp_ms,
            })?;
        ticks.push(Tick {
            timestamp,
            price: record.price,
            volume: record.volume,
        });
    }
    Ok(ticks)
}

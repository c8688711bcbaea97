//! CSV candle files.
//!
//! One file per symbol and timeframe: `<dir>/<SYMBOL>_<tf>.csv` with the
//! slash removed from the symbol, e.g. `EURUSD_1h.csv`. Header:
//! `timestamp,open,high,low,close,volume` (volume optional).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::Deserialize;
use std::path::{Path, PathBuf};

use super::provider::{keep_last, validate_series, CandleProvider, DataError};
use crate::domain::{Candle, Timeframe};

#[derive(Debug, Deserialize)]
struct CsvRow {
    timestamp: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    #[serde(default)]
    volume: Option<f64>,
}

/// Parse an RFC 3339, `YYYY-MM-DD HH:MM:SS` or bare `YYYY-MM-DD` timestamp
/// as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Read every candle of a CSV file, sorted ascending and validated.
pub fn read_candles_csv(path: &Path) -> Result<Vec<Candle>, DataError> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_path(path)?;

    let mut candles = Vec::new();
    for (i, row) in reader.deserialize::<CsvRow>().enumerate() {
        let row = row?;
        let timestamp = parse_timestamp(&row.timestamp).ok_or_else(|| {
            DataError::Validation(format!(
                "{}: row {}: unparseable timestamp '{}'",
                path.display(),
                i + 1,
                row.timestamp
            ))
        })?;
        candles.push(Candle {
            timestamp,
            open: row.open,
            high: row.high,
            low: row.low,
            close: row.close,
            volume: row.volume.unwrap_or(0.0),
        });
    }

    candles.sort_by_key(|c| c.timestamp);
    validate_series(&candles)?;
    Ok(candles)
}

/// Candle provider backed by a directory of CSV files.
#[derive(Debug, Clone)]
pub struct CsvProvider {
    dir: PathBuf,
}

impl CsvProvider {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// File holding `symbol` on `timeframe`.
    pub fn path_for(&self, symbol: &str, timeframe: Timeframe) -> PathBuf {
        self.dir.join(format!("{}_{}.csv", file_stem(symbol), timeframe))
    }
}

fn file_stem(symbol: &str) -> String {
    symbol.chars().filter(|c| *c != '/').collect()
}

impl CandleProvider for CsvProvider {
    fn name(&self) -> &str {
        "csv"
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let path = self.path_for(symbol, timeframe);
        if !path.exists() {
            return Err(DataError::NoData { symbol: symbol.to_string(), timeframe });
        }
        let candles = read_candles_csv(&path)?;
        if candles.is_empty() {
            return Err(DataError::NoData { symbol: symbol.to_string(), timeframe });
        }
        Ok(keep_last(candles, count))
    }
}

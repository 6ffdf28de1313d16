//! Loading bars from CSV.
//!
//! Expected header: `symbol,datetime,open,high,low,close,volume`.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use eventfolio_core::{Bar, Error, Result, TimestampMs};
use serde::Deserialize;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// One CSV row as written on disk.
#[derive(Debug, Deserialize)]
struct BarRecord {
    symbol: String,
    datetime: String,
    open: f64,
    high: f64,
    low: f64,
    close: f64,
    volume: f64,
}

impl BarRecord {
    fn into_bar(self) -> Result<Bar> {
        let ts_ms = parse_timestamp(&self.datetime)?;
        if !self.close.is_finite() || self.close <= 0.0 {
            return Err(Error::data(format!(
                "non-positive close {} for {} at {}",
                self.close, self.symbol, self.datetime
            )));
        }
        Ok(Bar {
            symbol: self.symbol,
            ts_ms,
            open: self.open,
            high: self.high,
            low: self.low,
            close: self.close,
            volume: self.volume,
        })
    }
}

/// Parse a bar timestamp into milliseconds since epoch (UTC).
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS` and `YYYY-MM-DD`.
pub fn parse_timestamp(raw: &str) -> Result<TimestampMs> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.timestamp_millis());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Ok(naive.and_utc().timestamp_millis());
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Ok(naive.and_utc().timestamp_millis());
        }
    }
    Err(Error::data(format!("unrecognised datetime {raw:?}")))
}

/// Read bars from any CSV reader.
pub fn read_bars_csv<R: Read>(reader: R) -> Result<Vec<Bar>> {
    let mut csv_reader = csv::Reader::from_reader(reader);
    let mut bars = Vec::new();

    for (row, record) in csv_reader.deserialize::<BarRecord>().enumerate() {
        let record = record.map_err(|e| Error::data(format!("row {}: {e}", row + 1)))?;
        bars.push(record.into_bar()?);
    }

    debug!(count = bars.len(), "bars read from csv");
    Ok(bars)
}

/// Read bars from a CSV file.
pub fn load_bars_csv(path: impl AsRef<Path>) -> Result<Vec<Bar>> {
    let file = std::fs::File::open(path)?;
    read_bars_csv(file)
}

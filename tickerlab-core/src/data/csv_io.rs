//! CSV import and export of bar series.
//!
//! Columns: `timestamp,open,high,low,close,volume`. On import a `date`
//! column (`YYYY-MM-DD`, midnight UTC) may stand in for `timestamp`, column
//! order is free, headers are case-insensitive, and empty price cells become
//! NaN. Imported rows are sorted ascending by timestamp.

use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;

use chrono::NaiveDate;

use super::provider::DataError;
use crate::domain::Bar;

struct Columns {
    timestamp: Option<usize>,
    date: Option<usize>,
    open: usize,
    high: usize,
    low: usize,
    close: usize,
    volume: Option<usize>,
}

impl Columns {
    fn from_headers(headers: &csv::StringRecord) -> Result<Self, DataError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };
        let require = |name: &str| {
            find(name).ok_or_else(|| DataError::InvalidRequest(format!("missing column '{name}'")))
        };

        let columns = Self {
            timestamp: find("timestamp"),
            date: find("date"),
            open: require("open")?,
            high: require("high")?,
            low: require("low")?,
            close: require("close")?,
            volume: find("volume"),
        };
        if columns.timestamp.is_none() && columns.date.is_none() {
            return Err(DataError::InvalidRequest(
                "missing column 'timestamp' or 'date'".into(),
            ));
        }
        Ok(columns)
    }
}

fn field<'a>(record: &'a csv::StringRecord, idx: usize) -> &'a str {
    record.get(idx).map(str::trim).unwrap_or("")
}

fn parse_price(record: &csv::StringRecord, idx: usize, line: u64) -> Result<f64, DataError> {
    let raw = field(record, idx);
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(f64::NAN);
    }
    raw.parse()
        .map_err(|_| DataError::InvalidRequest(format!("line {line}: invalid number '{raw}'")))
}

fn parse_volume(raw: &str, line: u64) -> Result<u64, DataError> {
    if raw.is_empty() || raw.eq_ignore_ascii_case("null") {
        return Ok(0);
    }
    if let Ok(v) = raw.parse::<u64>() {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v >= 0.0 => Ok(v.round() as u64),
        _ => Err(DataError::InvalidRequest(format!(
            "line {line}: invalid volume '{raw}'"
        ))),
    }
}

fn parse_timestamp(record: &csv::StringRecord, cols: &Columns, line: u64) -> Result<i64, DataError> {
    if let Some(idx) = cols.timestamp {
        let raw = field(record, idx);
        return raw.parse().map_err(|_| {
            DataError::InvalidRequest(format!("line {line}: invalid timestamp '{raw}'"))
        });
    }
    let raw = cols.date.map(|idx| field(record, idx)).unwrap_or("");
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc().timestamp())
        .ok_or_else(|| DataError::InvalidRequest(format!("line {line}: invalid date '{raw}'")))
}

pub fn read_bars<R: Read>(reader: R) -> Result<Vec<Bar>, DataError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(reader);
    let cols = Columns::from_headers(rdr.headers()?)?;

    let mut bars = Vec::new();
    for (i, record) in rdr.records().enumerate() {
        let record = record?;
        let line = i as u64 + 2;
        let volume = match cols.volume {
            Some(idx) => parse_volume(field(&record, idx), line)?,
            None => 0,
        };
        bars.push(Bar::new(
            parse_timestamp(&record, &cols, line)?,
            parse_price(&record, cols.open, line)?,
            parse_price(&record, cols.high, line)?,
            parse_price(&record, cols.low, line)?,
            parse_price(&record, cols.close, line)?,
            volume,
        ));
    }
    bars.sort_by_key(|b| b.timestamp);
    Ok(bars)
}

pub fn read_bars_file(path: &Path) -> Result<Vec<Bar>, DataError> {
    read_bars(File::open(path)?)
}

pub fn write_bars<W: Write>(writer: W, bars: &[Bar]) -> Result<(), DataError> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["timestamp", "open", "high", "low", "close", "volume"])?;
    for b in bars {
        wtr.write_record([
            b.timestamp.to_string(),
            b.open.to_string(),
            b.high.to_string(),
            b.low.to_string(),
            b.close.to_string(),
            b.volume.to_string(),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

pub fn write_bars_file(path: &Path, bars: &[Bar]) -> Result<(), DataError> {
    write_bars(File::create(path)?, bars)
}

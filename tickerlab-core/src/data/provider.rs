//! Series provider trait, request vocabulary and structured error types.
//!
//! The SeriesProvider trait abstracts over data sources (Yahoo Finance, CSV
//! import, synthetic series) so callers can swap implementations and mock for
//! tests. Caching sits above this trait; providers don't know about it.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::Bar;

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("hard stop: data provider has blocked requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("data error: {0}")]
    Other(String),
}

/// Where a series came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    YahooFinance,
    CsvImport,
    Cache,
    Synthetic,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataSource::YahooFinance => "yahoo_finance",
            DataSource::CsvImport => "csv",
            DataSource::Cache => "cache",
            DataSource::Synthetic => "synthetic",
        };
        f.write_str(name)
    }
}

/// Generates a string-backed vocabulary enum with `as_str`, `Display`,
/// `FromStr` and serde using the wire spelling.
macro_rules! vocabulary {
    ($(#[$meta:meta])* $name:ident { $($variant:ident => $wire:literal),+ $(,)? }) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $wire)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = DataError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok($name::$variant),)+
                    other => Err(DataError::InvalidRequest(format!(
                        concat!("unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

vocabulary! {
    /// Bar spacing.
    Interval {
        OneMinute => "1m",
        FiveMinutes => "5m",
        FifteenMinutes => "15m",
        ThirtyMinutes => "30m",
        OneHour => "1h",
        OneDay => "1d",
        OneWeek => "1wk",
        OneMonth => "1mo",
        ThreeMonths => "3mo",
    }
}

vocabulary! {
    /// How far back a request reaches.
    Range {
        OneDay => "1d",
        FiveDays => "5d",
        OneMonth => "1mo",
        ThreeMonths => "3mo",
        SixMonths => "6mo",
        OneYear => "1y",
        TwoYears => "2y",
        FiveYears => "5y",
        Max => "max",
    }
}

/// One series fetch: symbol plus interval and range.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SeriesRequest {
    pub symbol: String,
    pub interval: Interval,
    pub range: Range,
}

impl SeriesRequest {
    /// Symbols are trimmed and upper-cased.
    pub fn new(symbol: &str, interval: Interval, range: Range) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            interval,
            range,
        }
    }

    pub fn daily(symbol: &str, range: Range) -> Self {
        Self::new(symbol, Interval::OneDay, range)
    }

    /// Ticker symbols are alphanumerics plus `.`, `-`, `^` and `=`.
    pub fn validate(&self) -> Result<(), DataError> {
        let ok = !self.symbol.is_empty()
            && self
                .symbol
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '^' | '='));
        if ok {
            Ok(())
        } else {
            Err(DataError::InvalidRequest(format!(
                "invalid symbol '{}'",
                self.symbol
            )))
        }
    }

    pub fn cache_key(&self) -> String {
        format!("{}-{}-{}", self.symbol, self.interval, self.range)
    }
}

/// Trait for series providers.
pub trait SeriesProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Bars for the request, ascending by timestamp.
    fn fetch(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError>;

    /// Whether the provider currently accepts requests.
    fn is_available(&self) -> bool;
}

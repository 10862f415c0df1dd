//! Yahoo Finance series provider.
//!
//! Fetches OHLCV bars from Yahoo's v8 chart API. Handles rate limiting,
//! retries with exponential backoff, response parsing, and the circuit breaker.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes. CSV import and synthetic series are the fallbacks when it is
//! unavailable.

use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;
use tracing::{debug, warn};

use super::circuit_breaker::CircuitBreaker;
use super::provider::{DataError, SeriesProvider, SeriesRequest};
use crate::domain::Bar;

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<u64>>,
}

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

pub struct YahooProvider {
    client: reqwest::blocking::Client,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl YahooProvider {
    pub fn new(circuit_breaker: Arc<CircuitBreaker>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| DataError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            circuit_breaker,
            max_retries: 3,
            base_delay: Duration::from_millis(500),
        })
    }

    pub fn with_retries(mut self, max_retries: u32, base_delay: Duration) -> Self {
        self.max_retries = max_retries;
        self.base_delay = base_delay;
        self
    }

    fn chart_url(request: &SeriesRequest) -> String {
        format!(
            "{BASE_URL}/{}?interval={}&range={}",
            request.symbol, request.interval, request.range
        )
    }

    /// Rows where every field is null are skipped; partial rows keep NaN
    /// prices and zero volume. Output is sorted ascending and deduplicated.
    fn parse_response(symbol: &str, resp: ChartResponse) -> Result<Vec<Bar>, DataError> {
        let result = resp.chart.result.ok_or_else(|| match resp.chart.error {
            Some(err) if err.code == "Not Found" => DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            },
            Some(err) => {
                DataError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
            None => DataError::ResponseFormatChanged("empty result with no error".into()),
        })?;

        let data = result
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("result array is empty".into()))?;

        let timestamps = data
            .timestamp
            .ok_or_else(|| DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            })?;

        let quote = data
            .indicators
            .quote
            .into_iter()
            .next()
            .ok_or_else(|| DataError::ResponseFormatChanged("no quote data".into()))?;

        let mut bars = Vec::with_capacity(timestamps.len());
        for (i, &ts) in timestamps.iter().enumerate() {
            let open = quote.open.get(i).copied().flatten();
            let high = quote.high.get(i).copied().flatten();
            let low = quote.low.get(i).copied().flatten();
            let close = quote.close.get(i).copied().flatten();
            let volume = quote.volume.get(i).copied().flatten();

            if open.is_none()
                && high.is_none()
                && low.is_none()
                && close.is_none()
                && volume.is_none()
            {
                continue;
            }

            bars.push(Bar::new(
                ts,
                open.unwrap_or(f64::NAN),
                high.unwrap_or(f64::NAN),
                low.unwrap_or(f64::NAN),
                close.unwrap_or(f64::NAN),
                volume.unwrap_or(0),
            ));
        }

        if bars.is_empty() {
            return Err(DataError::SymbolNotFound {
                symbol: symbol.to_string(),
            });
        }

        bars.sort_by_key(|b| b.timestamp);
        bars.dedup_by_key(|b| b.timestamp);
        Ok(bars)
    }

    fn fetch_with_retry(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError> {
        let symbol = request.symbol.as_str();
        let url = Self::chart_url(request);
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                let delay = self.base_delay * 2u32.pow(attempt - 1);
                warn!(symbol, attempt, delay_ms = delay.as_millis() as u64, "retrying fetch");
                std::thread::sleep(delay);
            }

            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }
            if status == reqwest::StatusCode::NOT_FOUND {
                return Err(DataError::SymbolNotFound {
                    symbol: symbol.to_string(),
                });
            }
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                let retry_after = resp
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|v| v.parse::<u64>().ok())
                    .unwrap_or(60);
                last_error = Some(DataError::RateLimited {
                    retry_after_secs: retry_after,
                });
                continue;
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::Other(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let chart: ChartResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
            })?;
            let bars = Self::parse_response(symbol, chart)?;
            self.circuit_breaker.record_success();
            debug!(symbol, bars = bars.len(), "fetched series");
            return Ok(bars);
        }

        Err(last_error.unwrap_or_else(|| DataError::Other("max retries exceeded".into())))
    }
}

impl SeriesProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, request: &SeriesRequest) -> Result<Vec<Bar>, DataError> {
        request.validate()?;
        self.fetch_with_retry(request)
    }

    fn is_available(&self) -> bool {
        self.circuit_breaker.is_allowed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::provider::{Interval, Range};

    fn parse(json: &str) -> Result<Vec<Bar>, DataError> {
        let resp: ChartResponse = serde_json::from_str(json).unwrap();
        YahooProvider::parse_response("TEST", resp)
    }

    #[test]
    fn url_carries_interval_and_range() {
        let req = SeriesRequest::new("msft", Interval::OneWeek, Range::FiveYears);
        assert_eq!(
            YahooProvider::chart_url(&req),
            "https://query2.finance.yahoo.com/v8/finance/chart/MSFT?interval=1wk&range=5y"
        );
    }

    #[test]
    fn parses_rows_skipping_null_rows_and_sorting() {
        let bars = parse(
            r#"{"chart":{"result":[{"timestamp":[300,100,200],
                "indicators":{"quote":[{
                    "open":[3.0,1.0,null],"high":[3.5,1.5,null],
                    "low":[2.5,0.5,null],"close":[3.2,1.2,null],
                    "volume":[30,10,null]}]}}],"error":null}}"#,
        )
        .unwrap();
        assert_eq!(bars.len(), 2);
        assert_eq!(bars[0].timestamp, 100);
        assert_eq!(bars[1].timestamp, 300);
        assert_eq!(bars[1].close, 3.2);
        assert_eq!(bars[1].volume, 30);
    }

    #[test]
    fn partial_row_keeps_nan() {
        let bars = parse(
            r#"{"chart":{"result":[{"timestamp":[100],
                "indicators":{"quote":[{"open":[null],"high":[2.0],
                "low":[1.0],"close":[1.5],"volume":[null]}]}}],"error":null}}"#,
        )
        .unwrap();
        assert!(bars[0].open.is_nan());
        assert_eq!(bars[0].volume, 0);
    }

    #[test]
    fn not_found_error_maps_to_symbol_not_found() {
        let err = parse(
            r#"{"chart":{"result":null,"error":{"code":"Not Found","description":"No data found"}}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn missing_timestamps_is_symbol_not_found() {
        let err = parse(r#"{"chart":{"result":[{"indicators":{"quote":[{}]}}],"error":null}}"#)
            .unwrap_err();
        assert!(matches!(err, DataError::SymbolNotFound { .. }));
    }

    #[test]
    fn tripped_breaker_reports_unavailable() {
        let cb = Arc::new(CircuitBreaker::new(Duration::from_secs(60)));
        let provider = YahooProvider::new(Arc::clone(&cb)).unwrap();
        assert!(provider.is_available());
        cb.trip();
        assert!(!provider.is_available());
        let req = SeriesRequest::daily("AAPL", Range::OneMonth);
        assert!(matches!(
            provider.fetch(&req),
            Err(DataError::CircuitBreakerTripped)
        ));
    }
}

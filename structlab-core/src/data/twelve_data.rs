//! Twelve Data provider.
//!
//! Fetches intraday OHLC candles from the `time_series` endpoint. Handles
//! rate limiting, retries with exponential backoff, response parsing, and the
//! circuit breaker. Newest-first rows are returned oldest first.

use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;

use super::breaker::CircuitBreaker;
use super::csv_provider::parse_timestamp;
use super::provider::{keep_last, validate_series, CandleProvider, DataError};
use crate::domain::{Candle, Timeframe};

pub const DEFAULT_BASE_URL: &str = "https://api.twelvedata.com";
pub const DEFAULT_API_KEY_ENV: &str = "TWELVE_DATA_API_KEY";

/// `time_series` response. Success carries `values`; errors carry
/// `code`/`message` with `status = "error"`.
#[derive(Debug, Deserialize)]
struct TimeSeriesResponse {
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    code: Option<u16>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    values: Option<Vec<TimeSeriesRow>>,
}

#[derive(Debug, Deserialize)]
struct TimeSeriesRow {
    datetime: String,
    open: String,
    high: String,
    low: String,
    close: String,
    #[serde(default)]
    volume: Option<String>,
}

pub struct TwelveDataProvider {
    client: reqwest::blocking::Client,
    api_key: String,
    base_url: String,
    circuit_breaker: Arc<CircuitBreaker>,
    max_retries: u32,
    base_delay: Duration,
}

impl TwelveDataProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, DataError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| DataError::NetworkUnreachable(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            circuit_breaker: Arc::new(CircuitBreaker::per_minute_quota()),
            max_retries: 2,
            base_delay: Duration::from_millis(500),
        })
    }

    /// Read the API key from `var`.
    pub fn from_env(var: &str) -> Result<Self, DataError> {
        let key = std::env::var(var)
            .ok()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| DataError::MissingApiKey { var: var.to_string() })?;
        Self::new(key)
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_circuit_breaker(mut self, circuit_breaker: Arc<CircuitBreaker>) -> Self {
        self.circuit_breaker = circuit_breaker;
        self
    }

    fn url(&self) -> String {
        format!("{}/time_series", self.base_url.trim_end_matches('/'))
    }

    fn parse_response(
        symbol: &str,
        timeframe: Timeframe,
        resp: TimeSeriesResponse,
    ) -> Result<Vec<Candle>, DataError> {
        if resp.status.as_deref() == Some("error") || resp.values.is_none() {
            let message = resp.message.unwrap_or_else(|| "response has no values".into());
            return Err(match resp.code {
                Some(429) => DataError::RateLimited(message),
                Some(400) | Some(404) if message.to_lowercase().contains("symbol") => {
                    DataError::SymbolNotFound { symbol: symbol.to_string() }
                }
                _ => DataError::ResponseFormatChanged(message),
            });
        }

        let rows = resp.values.unwrap_or_default();
        if rows.is_empty() {
            return Err(DataError::NoData { symbol: symbol.to_string(), timeframe });
        }

        let mut candles = rows.iter().map(parse_row).collect::<Result<Vec<_>, _>>()?;
        candles.sort_by_key(|c| c.timestamp);
        validate_series(&candles)?;
        Ok(candles)
    }

    fn fetch_with_retry(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let url = self.url();
        let outputsize = count.to_string();
        let query = [
            ("symbol", symbol),
            ("interval", timeframe.twelve_data_interval()),
            ("outputsize", outputsize.as_str()),
            ("apikey", self.api_key.as_str()),
            ("format", "JSON"),
        ];
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                std::thread::sleep(self.base_delay * 2u32.pow(attempt - 1));
            }
            if !self.circuit_breaker.is_allowed() {
                return Err(DataError::CircuitBreakerTripped);
            }

            let resp = match self.client.get(&url).query(&query).send() {
                Ok(resp) => resp,
                Err(e) if e.is_connect() || e.is_timeout() => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::NetworkUnreachable(e.to_string()));
                    continue;
                }
                Err(e) => return Err(DataError::NetworkUnreachable(e.to_string())),
            };

            let status = resp.status();
            if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::RateLimited(format!("HTTP {status}")));
                continue;
            }
            if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
                self.circuit_breaker.trip();
                return Err(DataError::CircuitBreakerTripped);
            }
            if !status.is_success() {
                self.circuit_breaker.record_failure();
                last_error = Some(DataError::ResponseFormatChanged(format!("HTTP {status} for {symbol}")));
                continue;
            }

            let body: TimeSeriesResponse = resp.json().map_err(|e| {
                DataError::ResponseFormatChanged(format!("failed to parse response for {symbol}: {e}"))
            })?;

            match Self::parse_response(symbol, timeframe, body) {
                Ok(candles) => {
                    self.circuit_breaker.record_success();
                    return Ok(candles);
                }
                Err(DataError::RateLimited(msg)) => {
                    self.circuit_breaker.record_failure();
                    last_error = Some(DataError::RateLimited(msg));
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or_else(|| DataError::NetworkUnreachable("max retries exceeded".into())))
    }
}

fn parse_row(row: &TimeSeriesRow) -> Result<Candle, DataError> {
    let number = |field: &str, raw: &str| -> Result<f64, DataError> {
        raw.trim().parse::<f64>().map_err(|_| {
            DataError::ResponseFormatChanged(format!("{field} '{raw}' at {} is not a number", row.datetime))
        })
    };
    let timestamp = parse_timestamp(&row.datetime).ok_or_else(|| {
        DataError::ResponseFormatChanged(format!("unparseable datetime '{}'", row.datetime))
    })?;

    Ok(Candle {
        timestamp,
        open: number("open", &row.open)?,
        high: number("high", &row.high)?,
        low: number("low", &row.low)?,
        close: number("close", &row.close)?,
        volume: match row.volume.as_deref() {
            Some(v) => number("volume", v)?,
            None => 0.0,
        },
    })
}

impl CandleProvider for TwelveDataProvider {
    fn name(&self) -> &str {
        "twelve_data"
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataError> {
        let candles = self.fetch_with_retry(symbol, timeframe, count)?;
        Ok(keep_last(candles, count))
    }
}

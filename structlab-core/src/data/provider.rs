//! Candle provider trait and structured error types.
//!
//! The CandleProvider trait abstracts over data sources (Twelve Data, CSV
//! files, synthetic walks) so the runner can swap implementations and mock
//! them in tests.

use thiserror::Error;

use crate::domain::{Candle, Timeframe};

/// Structured error types for data operations.
#[derive(Debug, Error)]
pub enum DataError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider: {0}")]
    RateLimited(String),

    #[error("hard stop: provider refused further requests (circuit breaker tripped)")]
    CircuitBreakerTripped,

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("missing API key: environment variable {var} is not set")]
    MissingApiKey { var: String },

    #[error("symbol not found: {symbol}")]
    SymbolNotFound { symbol: String },

    #[error("no candles for {symbol} {timeframe}")]
    NoData { symbol: String, timeframe: Timeframe },

    #[error("validation error: {0}")]
    Validation(String),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Source of OHLC candles for one symbol and timeframe.
///
/// Implementations return at most `count` of the most recent candles in
/// ascending time order. The structure core never calls a provider itself.
pub trait CandleProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataError>;
}

impl<P: CandleProvider + ?Sized> CandleProvider for Box<P> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn fetch_candles(
        &self,
        symbol: &str,
        timeframe: Timeframe,
        count: usize,
    ) -> Result<Vec<Candle>, DataError> {
        (**self).fetch_candles(symbol, timeframe, count)
    }
}

/// Reject series a structure evaluation must not see: non-finite prices and
/// timestamps that are not strictly ascending.
pub fn validate_series(candles: &[Candle]) -> Result<(), DataError> {
    if let Some((i, _)) = candles.iter().enumerate().find(|(_, c)| c.is_void()) {
        return Err(DataError::Validation(format!("non-finite price at row {i}")));
    }
    if let Some(i) = candles.windows(2).position(|w| w[1].timestamp <= w[0].timestamp) {
        return Err(DataError::Validation(format!(
            "timestamps not strictly ascending at row {} ({} after {})",
            i + 1,
            candles[i + 1].timestamp,
            candles[i].timestamp
        )));
    }
    Ok(())
}

/// Keep only the most recent `count` candles.
pub(crate) fn keep_last(mut candles: Vec<Candle>, count: usize) -> Vec<Candle> {
    if candles.len() > count {
        candles.drain(..candles.len() - count);
    }
    candles
}

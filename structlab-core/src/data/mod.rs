//! Candle sources: the provider trait plus CSV, Twelve Data and synthetic
//! implementations.

pub mod breaker;
pub mod csv_provider;
pub mod provider;
pub mod synthetic;
pub mod twelve_data;

pub use breaker::CircuitBreaker;
pub use csv_provider::{parse_timestamp, read_candles_csv, CsvProvider};
pub use provider::{validate_series, CandleProvider, DataError};
pub use synthetic::{generate_synthetic_candles, SyntheticProvider};
pub use twelve_data::{TwelveDataProvider, DEFAULT_API_KEY_ENV};

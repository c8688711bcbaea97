//! Serializable signal configuration.
//!
//! One TOML file describes one symbol's evaluation: which timeframes, how
//! many candles, the structure settings, where the USD index comes from and
//! which candle provider to use.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use thiserror::Error;

use structlab_core::basket::USD_BASKET;
use structlab_core::data::{
    CandleProvider, CsvProvider, DataError, SyntheticProvider, TwelveDataProvider,
    DEFAULT_API_KEY_ENV,
};
use structlab_core::domain::{usd_position, ConfigId, SymbolError, Timeframe};
use structlab_core::structure::{
    ConfirmationRule, StructureConfigError, StructureEvaluator, DEFAULT_LOOKBACK,
};

pub const DEFAULT_CANDLE_COUNT: usize = 300;
pub const DEFAULT_INDEX_SYMBOL: &str = "DXY";
pub const DEFAULT_LOG_DIR: &str = "logs/decisions";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("serialize config TOML: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error(transparent)]
    Symbol(#[from] SymbolError),

    #[error(transparent)]
    Structure(#[from] StructureConfigError),

    #[error("at least one timeframe is required")]
    NoTimeframes,

    #[error("timeframe {0} is listed more than once")]
    DuplicateTimeframe(Timeframe),

    #[error("candle_count {count} is below the minimum of {min} for lookback {lookback}")]
    CandleCountTooSmall { count: usize, min: usize, lookback: usize },

    #[error("index basket has no pairs")]
    EmptyBasket,

    #[error("provider setup failed: {0}")]
    Provider(#[from] DataError),
}

/// Where the USD index alignment comes from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexSource {
    /// A tradable index instrument (e.g. DXY) evaluated like a pair.
    Instrument { symbol: String },
    /// Plurality vote over several USD pairs.
    Basket {
        #[serde(default = "default_basket")]
        pairs: Vec<String>,
    },
}

impl Default for IndexSource {
    fn default() -> Self {
        IndexSource::Instrument { symbol: DEFAULT_INDEX_SYMBOL.to_string() }
    }
}

impl IndexSource {
    /// Short label for logs and reports.
    pub fn label(&self) -> String {
        match self {
            IndexSource::Instrument { symbol } => symbol.clone(),
            IndexSource::Basket { pairs } => format!("basket[{}]", pairs.join(",")),
        }
    }
}

/// Candle source.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProviderConfig {
    Csv { dir: PathBuf },
    TwelveData {
        #[serde(default = "default_api_key_env")]
        api_key_env: String,
    },
    /// `seed` is a `u32` so every value fits a TOML integer.
    Synthetic {
        #[serde(default)]
        seed: u32,
    },
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::TwelveData { api_key_env: default_api_key_env() }
    }
}

impl ProviderConfig {
    /// Instantiate the provider. Twelve Data reads its key from the
    /// environment here, so a missing key fails before any request.
    pub fn build(&self) -> Result<Box<dyn CandleProvider>, ConfigError> {
        let provider: Box<dyn CandleProvider> = match self {
            ProviderConfig::Csv { dir } => Box::new(CsvProvider::new(dir.clone())),
            ProviderConfig::TwelveData { api_key_env } => {
                Box::new(TwelveDataProvider::from_env(api_key_env)?)
            }
            ProviderConfig::Synthetic { seed } => Box::new(SyntheticProvider::new(u64::from(*seed))),
        };
        Ok(provider)
    }
}

/// Serializable configuration for one signal evaluation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct SignalConfig {
    /// Pair to evaluate, e.g. "EUR/USD".
    pub symbol: String,

    /// Timeframes in priority order; the first aligned one supplies the zone.
    #[serde(default = "default_timeframes")]
    pub timeframes: Vec<Timeframe>,

    /// Candles fetched per timeframe.
    #[serde(default = "default_candle_count")]
    pub candle_count: usize,

    /// Swing lookback L.
    #[serde(default = "default_lookback")]
    pub lookback: usize,

    #[serde(default)]
    pub confirmation: ConfirmationRule,

    /// Directory for the daily JSONL decision log.
    #[serde(default = "default_log_dir")]
    pub log_dir: PathBuf,

    #[serde(default)]
    pub index: IndexSource,

    #[serde(default)]
    pub provider: ProviderConfig,
}

fn default_timeframes() -> Vec<Timeframe> {
    vec![Timeframe::H1, Timeframe::M30, Timeframe::M15]
}

fn default_candle_count() -> usize {
    DEFAULT_CANDLE_COUNT
}

fn default_lookback() -> usize {
    DEFAULT_LOOKBACK
}

fn default_basket() -> Vec<String> {
    USD_BASKET.iter().map(|s| s.to_string()).collect()
}

fn default_api_key_env() -> String {
    DEFAULT_API_KEY_ENV.to_string()
}

fn default_log_dir() -> PathBuf {
    PathBuf::from(DEFAULT_LOG_DIR)
}

impl SignalConfig {
    /// Defaults for `symbol`.
    pub fn for_symbol(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframes: default_timeframes(),
            candle_count: DEFAULT_CANDLE_COUNT,
            lookback: DEFAULT_LOOKBACK,
            confirmation: ConfirmationRule::default(),
            log_dir: default_log_dir(),
            index: IndexSource::default(),
            provider: ProviderConfig::default(),
        }
    }

    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Fail fast on anything the pipeline would otherwise trip over mid-run.
    pub fn validate(&self) -> Result<(), ConfigError> {
        usd_position(&self.symbol)?;

        if self.timeframes.is_empty() {
            return Err(ConfigError::NoTimeframes);
        }
        let mut seen = HashSet::new();
        if let Some(dup) = self.timeframes.iter().find(|tf| !seen.insert(**tf)) {
            return Err(ConfigError::DuplicateTimeframe(*dup));
        }

        let evaluator = self.evaluator()?;
        let min = evaluator.min_candles();
        if self.candle_count < min {
            return Err(ConfigError::CandleCountTooSmall {
                count: self.candle_count,
                min,
                lookback: self.lookback,
            });
        }

        if let IndexSource::Basket { pairs } = &self.index {
            if pairs.is_empty() {
                return Err(ConfigError::EmptyBasket);
            }
            for pair in pairs {
                usd_position(pair)?;
            }
        }
        Ok(())
    }

    pub fn evaluator(&self) -> Result<StructureEvaluator, ConfigError> {
        Ok(StructureEvaluator::new(self.lookback, self.confirmation)?)
    }

    /// Content hash of the canonical JSON form. Two identical configs share
    /// an id, so decision log entries can be grouped by configuration.
    pub fn config_id(&self) -> ConfigId {
        let canonical = serde_json::to_vec(self).unwrap_or_else(|_| format!("{self:?}").into_bytes());
        ConfigId::from_bytes(&canonical)
    }
}

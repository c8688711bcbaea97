//! USD-relative reading of a currency pair.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::Direction;

/// Where USD sits in a pair symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsdPosition {
    /// `USD/JPY`: the pair rises when USD strengthens.
    Base,
    /// `EUR/USD`: the pair rises when USD weakens.
    Quote,
}

/// Strength or weakness of USD implied by a structural direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UsdBias {
    Strong,
    Weak,
}

impl UsdBias {
    pub fn as_str(&self) -> &'static str {
        match self {
            UsdBias::Strong => "strong",
            UsdBias::Weak => "weak",
        }
    }
}

impl fmt::Display for UsdBias {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("unsupported symbol for USD logic: '{0}'")]
    NotUsdPair(String),
}

/// Classify a symbol by where USD sits in it.
///
/// Base if the symbol starts with "USD", quote if it ends with "USD". Anything
/// else cannot be read against a USD index and is rejected.
pub fn usd_position(symbol: &str) -> Result<UsdPosition, SymbolError> {
    if symbol.starts_with("USD") {
        Ok(UsdPosition::Base)
    } else if symbol.ends_with("USD") {
        Ok(UsdPosition::Quote)
    } else {
        Err(SymbolError::NotUsdPair(symbol.to_string()))
    }
}

/// USD bias implied by a pair's structural direction.
pub fn implied_usd_bias(pair_direction: Direction, position: UsdPosition) -> UsdBias {
    match (position, pair_direction) {
        (UsdPosition::Quote, Direction::Bullish) => UsdBias::Weak,
        (UsdPosition::Quote, Direction::Bearish) => UsdBias::Strong,
        (UsdPosition::Base, Direction::Bullish) => UsdBias::Strong,
        (UsdPosition::Base, Direction::Bearish) => UsdBias::Weak,
    }
}

/// USD bias read directly off a USD index direction.
pub fn index_usd_bias(index_direction: Direction) -> UsdBias {
    match index_direction {
        Direction::Bullish => UsdBias::Strong,
        Direction::Bearish => UsdBias::Weak,
    }
}

/// Direction expressed in USD terms: quote-position pairs are inverted.
pub fn usd_direction(pair_direction: Direction, position: UsdPosition) -> Direction {
    match position {
        UsdPosition::Base => pair_direction,
        UsdPosition::Quote => pair_direction.invert(),
    }
}

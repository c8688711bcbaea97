//! Index confirmation: the pair's implied USD bias must agree with the index.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alignment::AlignmentResult;
use crate::domain::{implied_usd_bias, index_usd_bias, usd_position, SymbolError, UsdBias};

/// Why the index filter refused a trade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexRejection {
    PairNotAligned,
    IndexNotAligned,
    BiasMismatch { expected: UsdBias, actual: UsdBias },
}

impl fmt::Display for IndexRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexRejection::PairNotAligned => f.write_str("Pair structure not aligned"),
            IndexRejection::IndexNotAligned => f.write_str("Index structure not aligned"),
            IndexRejection::BiasMismatch { expected, actual } => {
                write!(f, "Index contradicts USD bias (expected {expected}, got {actual})")
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum IndexConfirmation {
    Confirmed,
    Rejected { rejection: IndexRejection },
}

impl IndexConfirmation {
    pub fn is_allowed(&self) -> bool {
        matches!(self, IndexConfirmation::Confirmed)
    }

    pub fn reason(&self) -> Option<String> {
        match self {
            IndexConfirmation::Confirmed => None,
            IndexConfirmation::Rejected { rejection } => Some(rejection.to_string()),
        }
    }
}

/// Cross-check a pair's alignment against a USD index alignment.
///
/// Either side not aligned fails closed. Otherwise the pair direction is read
/// as a USD bias through the symbol's USD position and compared with the
/// index direction (bullish index = strong USD). A symbol without USD at
/// either end is a configuration error and is returned as `Err`.
pub fn index_confirms_pair(
    symbol: &str,
    pair: &AlignmentResult,
    index: &AlignmentResult,
) -> Result<IndexConfirmation, SymbolError> {
    let Some(pair_direction) = pair.direction() else {
        return Ok(rejected(IndexRejection::PairNotAligned));
    };
    let Some(index_direction) = index.direction() else {
        return Ok(rejected(IndexRejection::IndexNotAligned));
    };

    let expected = implied_usd_bias(pair_direction, usd_position(symbol)?);
    let actual = index_usd_bias(index_direction);

    if expected != actual {
        return Ok(rejected(IndexRejection::BiasMismatch { expected, actual }));
    }
    Ok(IndexConfirmation::Confirmed)
}

fn rejected(rejection: IndexRejection) -> IndexConfirmation {
    IndexConfirmation::Rejected { rejection }
}

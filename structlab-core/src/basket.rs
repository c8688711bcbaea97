//! Synthetic USD basket: a USD bias voted from several USD pairs.
//!
//! Used in place of an index instrument when none is available. Every pair's
//! aligned direction is first translated into USD terms (quote-USD pairs are
//! inverted), then a simple plurality decides.

use crate::alignment::AlignmentResult;
use crate::domain::{usd_direction, usd_position, Direction, SymbolError};

/// Default basket: two quote-USD majors and one base-USD major.
pub const USD_BASKET: [&str; 3] = ["EUR/USD", "GBP/USD", "USD/JPY"];

/// Plurality USD direction across the basket.
///
/// Non-aligned pairs abstain. Bullish means USD strength. A tie, or no votes
/// at all, is `None`. A symbol without USD at either end is rejected.
pub fn usd_basket_bias<S>(pairs: &[(S, AlignmentResult)]) -> Result<Option<Direction>, SymbolError>
where
    S: AsRef<str>,
{
    let mut bullish = 0usize;
    let mut bearish = 0usize;

    for (symbol, alignment) in pairs {
        let position = usd_position(symbol.as_ref())?;
        let Some(direction) = alignment.direction() else {
            continue;
        };
        match usd_direction(direction, position) {
            Direction::Bullish => bullish += 1,
            Direction::Bearish => bearish += 1,
        }
    }

    Ok(match bullish.cmp(&bearish) {
        std::cmp::Ordering::Greater => Some(Direction::Bullish),
        std::cmp::Ordering::Less => Some(Direction::Bearish),
        std::cmp::Ordering::Equal => None,
    })
}

/// Basket bias in the shape the index filter expects.
pub fn usd_basket_alignment<S>(pairs: &[(S, AlignmentResult)]) -> Result<AlignmentResult, SymbolError>
where
    S: AsRef<str>,
{
    usd_basket_bias(pairs).map(AlignmentResult::from_bias)
}

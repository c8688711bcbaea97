//! Break of structure: the latest close taking out the most recent swing.

use serde::{Deserialize, Serialize};

use crate::domain::Direction;

use super::swing::{SwingPoint, SwingSet};

/// A break of the most recent swing high or low by the latest close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BosEvent {
    pub direction: Direction,
    /// The swing that was broken.
    pub level: SwingPoint,
    /// Index of the breaking close.
    pub index: usize,
}

/// Detect the current break of structure, if any.
///
/// Only the last close is tested, and only against the single most recent
/// swing high and swing low. A close above the high is bullish, otherwise a
/// close below the low is bearish. A close anywhere inside the two levels
/// (inclusive) is no break. Without both a swing high and a swing low there
/// is nothing to break.
pub fn detect_bos(closes: &[f64], swings: &SwingSet) -> Option<BosEvent> {
    let last_high = swings.last_high()?;
    let last_low = swings.last_low()?;
    let (&last_close, _) = closes.split_last()?;
    let index = closes.len() - 1;

    if last_close > last_high.price {
        Some(BosEvent { direction: Direction::Bullish, level: *last_high, index })
    } else if last_close < last_low.price {
        Some(BosEvent { direction: Direction::Bearish, level: *last_low, index })
    } else {
        None
    }
}

//! Swing detection on a close-only (line chart) series.

use serde::{Deserialize, Serialize};

/// Default symmetric lookback window.
pub const DEFAULT_LOOKBACK: usize = 3;

/// A local extremum of the close series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SwingPoint {
    /// Position in the series (0 = oldest).
    pub index: usize,
    /// Close at `index`.
    pub price: f64,
}

/// Swing highs and lows, each in ascending index order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SwingSet {
    pub highs: Vec<SwingPoint>,
    pub lows: Vec<SwingPoint>,
}

impl SwingSet {
    /// Most recent swing high.
    pub fn last_high(&self) -> Option<&SwingPoint> {
        self.highs.last()
    }

    /// Most recent swing low.
    pub fn last_low(&self) -> Option<&SwingPoint> {
        self.lows.last()
    }

    pub fn is_empty(&self) -> bool {
        self.highs.is_empty() && self.lows.is_empty()
    }
}

/// Detect swing highs and lows with a symmetric window of `lookback` closes.
///
/// Every index `i` in `[lookback, n - lookback - 1]` is compared with the
/// window `[i - lookback, i + lookback]`. A close equal to the window maximum
/// is a swing high, equal to the window minimum a swing low; a flat window
/// puts the point in both lists. Points closer than `lookback` to either edge
/// are never classified, so a series shorter than `2 * lookback + 1` has no
/// swings at all.
pub fn detect_swings(closes: &[f64], lookback: usize) -> SwingSet {
    let mut swings = SwingSet::default();
    let end = closes.len().saturating_sub(lookback);

    for i in lookback..end {
        let window = &closes[i - lookback..=i + lookback];
        let current = closes[i];

        let max = window.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        let min = window.iter().copied().fold(f64::INFINITY, f64::min);

        if current == max {
            swings.highs.push(SwingPoint { index: i, price: current });
        }
        if current == min {
            swings.lows.push(SwingPoint { index: i, price: current });
        }
    }

    swings
}

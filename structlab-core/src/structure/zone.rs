//! Structure zone: the interval between a broken level and its failure point.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, Timeframe};
use crate::patterns::PriceZone;

use super::swing::SwingPoint;

/// A completed structure zone on one timeframe.
///
/// `lower <= upper` always holds; `failure_index > bos_index` holds for every
/// zone produced by the structure evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StructureZone {
    pub direction: Direction,
    pub lower: f64,
    pub upper: f64,
    pub bos_index: usize,
    pub failure_index: usize,
    pub timeframe: Timeframe,
}

impl StructureZone {
    pub fn price_zone(&self) -> PriceZone {
        PriceZone { low: self.lower, high: self.upper }
    }

    pub fn width(&self) -> f64 {
        self.upper - self.lower
    }
}

/// Combine a broken level and its failure point into a zone.
///
/// Bullish zones run from the higher low up to the broken high, bearish zones
/// from the broken low up to the lower high. The bounds are stored min/max
/// ordered whichever way round the inputs arrive.
pub fn build_zone(
    direction: Direction,
    bos_level: SwingPoint,
    failure_point: SwingPoint,
    timeframe: Timeframe,
    bos_index: usize,
) -> StructureZone {
    let (lower, upper) = match direction {
        Direction::Bullish => (failure_point.price, bos_level.price),
        Direction::Bearish => (bos_level.price, failure_point.price),
    };

    StructureZone {
        direction,
        lower: lower.min(upper),
        upper: lower.max(upper),
        bos_index,
        failure_index: failure_point.index,
        timeframe,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn point(index: usize, price: f64) -> SwingPoint {
        SwingPoint { index, price }
    }

    #[test]
    fn bullish_zone_bounds_are_ordered() {
        // a higher low sits above the broken high
        let zone = build_zone(Direction::Bullish, point(3, 1.10), point(12, 1.13), Timeframe::H1, 8);
        assert_eq!(zone.lower, 1.10);
        assert_eq!(zone.upper, 1.13);
        assert_eq!(zone.bos_index, 8);
        assert_eq!(zone.failure_index, 12);
        assert_eq!(zone.timeframe, Timeframe::H1);
        assert!((zone.width() - 0.03).abs() < 1e-12);
    }

    #[test]
    fn bearish_zone_bounds_are_ordered() {
        let zone = build_zone(Direction::Bearish, point(3, 1.00), point(9, 0.97), Timeframe::M15, 6);
        assert_eq!(zone.lower, 0.97);
        assert_eq!(zone.upper, 1.00);
        assert_eq!(zone.direction, Direction::Bearish);
    }

    #[test]
    fn inverted_inputs_are_swapped() {
        let zone = build_zone(Direction::Bullish, point(3, 1.20), point(9, 1.05), Timeframe::M30, 6);
        assert!(zone.lower <= zone.upper);
        assert_eq!(zone.price_zone(), PriceZone { low: 1.05, high: 1.20 });
    }
}

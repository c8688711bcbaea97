//! Multi-timeframe alignment: 2-of-N voting over per-timeframe verdicts.

use serde::{Deserialize, Serialize};

use crate::domain::{Direction, Timeframe};
use crate::structure::StructureResult;

/// Minimum number of valid timeframes that must share a direction.
pub const MIN_ALIGNED_TIMEFRAMES: usize = 2;

pub const NOT_ALIGNED_REASON: &str = "Fewer than two aligned timeframes";

/// Pair-level direction fused from several timeframes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AlignmentResult {
    Aligned {
        direction: Direction,
        /// Timeframes voting for `direction`, in the caller's order.
        timeframes: Vec<Timeframe>,
    },
    NotAligned,
}

impl AlignmentResult {
    /// Wrap a bare directional bias (e.g. from a currency basket) with no
    /// contributing timeframes.
    pub fn from_bias(bias: Option<Direction>) -> Self {
        match bias {
            Some(direction) => AlignmentResult::Aligned { direction, timeframes: Vec::new() },
            None => AlignmentResult::NotAligned,
        }
    }

    pub fn is_aligned(&self) -> bool {
        matches!(self, AlignmentResult::Aligned { .. })
    }

    pub fn direction(&self) -> Option<Direction> {
        match self {
            AlignmentResult::Aligned { direction, .. } => Some(*direction),
            AlignmentResult::NotAligned => None,
        }
    }

    pub fn timeframes(&self) -> &[Timeframe] {
        match self {
            AlignmentResult::Aligned { timeframes, .. } => timeframes,
            AlignmentResult::NotAligned => &[],
        }
    }

    pub fn reason(&self) -> Option<&'static str> {
        match self {
            AlignmentResult::Aligned { .. } => None,
            AlignmentResult::NotAligned => Some(NOT_ALIGNED_REASON),
        }
    }
}

/// Apply the alignment vote.
///
/// Only valid results vote. Two or more bullish timeframes align bullish
/// with exactly those timeframes; otherwise two or more bearish align
/// bearish. A dissenting third timeframe does not block alignment. Bullish
/// is checked first, which only matters for four or more timeframes.
pub fn evaluate_alignment(results: &[(Timeframe, StructureResult)]) -> AlignmentResult {
    let voters = |wanted: Direction| -> Vec<Timeframe> {
        results
            .iter()
            .filter(|(_, result)| result.direction() == Some(wanted))
            .map(|(tf, _)| *tf)
            .collect()
    };

    for direction in [Direction::Bullish, Direction::Bearish] {
        let timeframes = voters(direction);
        if timeframes.len() >= MIN_ALIGNED_TIMEFRAMES {
            return AlignmentResult::Aligned { direction, timeframes };
        }
    }

    AlignmentResult::NotAligned
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::structure::{StructureFailure, StructureZone};

    fn valid(tf: Timeframe, direction: Direction) -> (Timeframe, StructureResult) {
        let zone = StructureZone {
            direction,
            lower: 1.0,
            upper: 1.1,
            bos_index: 10,
            failure_index: 14,
            timeframe: tf,
        };
        (tf, StructureResult::Valid { zone })
    }

    fn invalid(tf: Timeframe) -> (Timeframe, StructureResult) {
        (tf, StructureResult::Invalid { reason: StructureFailure::NoBos })
    }

    #[test]
    fn two_of_three_bullish() {
        let results = vec![
            valid(Timeframe::H1, Direction::Bullish),
            valid(Timeframe::M30, Direction::Bearish),
            valid(Timeframe::M15, Direction::Bullish),
        ];
        let aligned = evaluate_alignment(&results);
        assert_eq!(
            aligned,
            AlignmentResult::Aligned {
                direction: Direction::Bullish,
                timeframes: vec![Timeframe::H1, Timeframe::M15],
            }
        );
        assert!(aligned.reason().is_none());
    }

    #[test]
    fn three_of_three_bearish() {
        let results = vec![
            valid(Timeframe::H1, Direction::Bearish),
            valid(Timeframe::M30, Direction::Bearish),
            valid(Timeframe::M15, Direction::Bearish),
        ];
        let aligned = evaluate_alignment(&results);
        assert_eq!(aligned.direction(), Some(Direction::Bearish));
        assert_eq!(aligned.timeframes().len(), 3);
    }

    #[test]
    fn invalid_results_do_not_vote() {
        let results = vec![
            valid(Timeframe::H1, Direction::Bullish),
            invalid(Timeframe::M30),
            invalid(Timeframe::M15),
        ];
        let aligned = evaluate_alignment(&results);
        assert_eq!(aligned, AlignmentResult::NotAligned);
        assert_eq!(aligned.reason(), Some("Fewer than two aligned timeframes"));
        assert!(aligned.timeframes().is_empty());
    }

    #[test]
    fn split_vote_is_not_aligned() {
        let results = vec![
            valid(Timeframe::H1, Direction::Bullish),
            valid(Timeframe::M30, Direction::Bearish),
            invalid(Timeframe::M15),
        ];
        assert!(!evaluate_alignment(&results).is_aligned());
        assert!(!evaluate_alignment(&[]).is_aligned());
    }

    #[test]
    fn from_bias() {
        assert_eq!(AlignmentResult::from_bias(None), AlignmentResult::NotAligned);
        let aligned = AlignmentResult::from_bias(Some(Direction::Bearish));
        assert_eq!(aligned.direction(), Some(Direction::Bearish));
        assert!(aligned.timeframes().is_empty());
    }
}

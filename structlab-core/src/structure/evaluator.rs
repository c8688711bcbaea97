//! Single-timeframe structure evaluation.
//!
//! State machine per call:
//! - no break of structure -> `Invalid(NoBos)`
//! - break but no confirmed failure point -> `Invalid(NoFailureConfirmation)`
//! - break and failure point -> `Valid(zone)`
//!
//! Each evaluation is a pure single pass over the candle window; evaluating
//! the same series twice yields the same result.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::domain::{closes, Candle, Direction, Timeframe};

use super::bos::{detect_bos, BosEvent};
use super::failure::{detect_failure, AlwaysConfirm, FailureConfirmation, PatternConfirmation};
use super::swing::{detect_swings, SwingPoint, SwingSet, DEFAULT_LOOKBACK};
use super::zone::{build_zone, StructureZone};

/// Why a timeframe has no valid structure. Expected and frequent; not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StructureFailure {
    NoBos,
    NoFailureConfirmation,
}

impl fmt::Display for StructureFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StructureFailure::NoBos => f.write_str("No BOS"),
            StructureFailure::NoFailureConfirmation => f.write_str("No failure confirmation"),
        }
    }
}

/// Verdict for one timeframe: either a zone or a reason, never both.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum StructureResult {
    Valid { zone: StructureZone },
    Invalid { reason: StructureFailure },
}

impl StructureResult {
    pub fn is_valid(&self) -> bool {
        matches!(self, StructureResult::Valid { .. })
    }

    pub fn direction(&self) -> Option<Direction> {
        self.zone().map(|z| z.direction)
    }

    pub fn zone(&self) -> Option<&StructureZone> {
        match self {
            StructureResult::Valid { zone } => Some(zone),
            StructureResult::Invalid { .. } => None,
        }
    }

    /// Human-readable reason for an invalid result.
    pub fn reason(&self) -> Option<String> {
        match self {
            StructureResult::Valid { .. } => None,
            StructureResult::Invalid { reason } => Some(reason.to_string()),
        }
    }
}

/// Which candle rule gates failure candidates.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationRule {
    /// Accept every structurally valid candidate.
    #[default]
    PassThrough,
    /// Require zone penetration plus a big shadow or star pattern.
    CandlePattern,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructureConfigError {
    #[error("swing lookback must be >= 1")]
    ZeroLookback,
}

/// Configured structure evaluator: lookback window plus confirmation rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StructureEvaluator {
    lookback: usize,
    rule: ConfirmationRule,
}

impl Default for StructureEvaluator {
    fn default() -> Self {
        Self { lookback: DEFAULT_LOOKBACK, rule: ConfirmationRule::PassThrough }
    }
}

impl StructureEvaluator {
    pub fn new(lookback: usize, rule: ConfirmationRule) -> Result<Self, StructureConfigError> {
        if lookback == 0 {
            return Err(StructureConfigError::ZeroLookback);
        }
        Ok(Self { lookback, rule })
    }

    pub fn lookback(&self) -> usize {
        self.lookback
    }

    pub fn rule(&self) -> ConfirmationRule {
        self.rule
    }

    /// Smallest series that can produce a swing on both sides of a break.
    pub fn min_candles(&self) -> usize {
        2 * self.lookback + 2
    }

    pub fn evaluate(&self, candles: &[Candle], timeframe: Timeframe) -> StructureResult {
        evaluate_with(candles, timeframe, self.lookback, |bos, swings| match self.rule {
            ConfirmationRule::PassThrough => detect_failure(bos, swings, &AlwaysConfirm),
            ConfirmationRule::CandlePattern => {
                detect_failure(bos, swings, &PatternConfirmation::new(candles, bos))
            }
        })
    }
}

/// Evaluate one timeframe with a caller-supplied confirmation rule.
pub fn evaluate_structure<C>(
    candles: &[Candle],
    timeframe: Timeframe,
    lookback: usize,
    confirm: &C,
) -> StructureResult
where
    C: FailureConfirmation + ?Sized,
{
    evaluate_with(candles, timeframe, lookback, |bos, swings| detect_failure(bos, swings, confirm))
}

fn evaluate_with<F>(
    candles: &[Candle],
    timeframe: Timeframe,
    lookback: usize,
    find_failure: F,
) -> StructureResult
where
    F: FnOnce(&BosEvent, &SwingSet) -> Option<SwingPoint>,
{
    let closes = closes(candles);
    let swings = detect_swings(&closes, lookback);

    let Some(bos) = detect_bos(&closes, &swings) else {
        return StructureResult::Invalid { reason: StructureFailure::NoBos };
    };

    let Some(failure) = find_failure(&bos, &swings) else {
        return StructureResult::Invalid { reason: StructureFailure::NoFailureConfirmation };
    };

    StructureResult::Valid {
        zone: build_zone(bos.direction, bos.level, failure, timeframe, bos.index),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patterns::test_support::series;

    fn line(closes: &[f64]) -> Vec<Candle> {
        let rows: Vec<_> = closes.iter().map(|&c| (c, c + 0.5, c - 0.5, c)).collect();
        series(&rows)
    }

    #[test]
    fn no_swings_means_no_bos() {
        let candles = line(&[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let result = StructureEvaluator::default().evaluate(&candles, Timeframe::H1);
        assert_eq!(result, StructureResult::Invalid { reason: StructureFailure::NoBos });
        assert_eq!(result.reason().as_deref(), Some("No BOS"));
        assert!(result.zone().is_none());
        assert!(result.direction().is_none());
    }

    #[test]
    fn close_inside_range_means_no_bos() {
        let candles = line(&[1.0, 2.0, 3.0, 5.0, 3.0, 2.0, 1.0, 0.5, 1.0, 2.0, 3.0]);
        let result = StructureEvaluator::default().evaluate(&candles, Timeframe::H1);
        assert_eq!(result.reason().as_deref(), Some("No BOS"));
    }

    #[test]
    fn break_without_failure_is_incomplete() {
        let candles = line(&[1.0, 2.0, 3.0, 5.0, 3.0, 2.0, 1.0, 0.5, 1.0, 2.0, 6.0]);
        let result = StructureEvaluator::default().evaluate(&candles, Timeframe::H1);
        assert_eq!(
            result,
            StructureResult::Invalid { reason: StructureFailure::NoFailureConfirmation }
        );
        assert_eq!(result.reason().as_deref(), Some("No failure confirmation"));
    }

    #[test]
    fn injected_rule_cannot_confirm_a_break_on_the_last_close() {
        let candles = line(&[1.0, 2.0, 3.0, 5.0, 3.0, 2.0, 1.0, 0.5, 1.0, 2.0, 6.0]);
        let never = |_: usize| false;
        let result = evaluate_structure(&candles, Timeframe::M15, 3, &never);
        assert_eq!(result.reason().as_deref(), Some("No failure confirmation"));
        let result = evaluate_structure(&candles, Timeframe::M15, 3, &AlwaysConfirm);
        assert_eq!(result.reason().as_deref(), Some("No failure confirmation"));
    }

    #[test]
    fn candle_pattern_rule_runs_the_same_state_machine() {
        let candles = line(&[1.0, 2.0, 3.0, 5.0, 3.0, 2.0, 1.0, 0.5, 1.0, 2.0, 6.0]);
        let evaluator = StructureEvaluator::new(3, ConfirmationRule::CandlePattern).unwrap();
        let result = evaluator.evaluate(&candles, Timeframe::H4);
        assert_eq!(result.reason().as_deref(), Some("No failure confirmation"));
    }

    #[test]
    fn zero_lookback_is_rejected() {
        assert_eq!(
            StructureEvaluator::new(0, ConfirmationRule::PassThrough),
            Err(StructureConfigError::ZeroLookback)
        );
        let ok = StructureEvaluator::new(2, ConfirmationRule::CandlePattern).unwrap();
        assert_eq!(ok.lookback(), 2);
        assert_eq!(ok.rule(), ConfirmationRule::CandlePattern);
        assert_eq!(ok.min_candles(), 6);
    }

    #[test]
    fn evaluation_is_idempotent() {
        let candles = line(&[1.0, 2.0, 3.0, 5.0, 3.0, 2.0, 1.0, 0.5, 1.0, 2.0, 6.0]);
        let evaluator = StructureEvaluator::default();
        assert_eq!(
            evaluator.evaluate(&candles, Timeframe::H1),
            evaluator.evaluate(&candles, Timeframe::H1)
        );
    }

    #[test]
    fn result_serialization_is_tagged() {
        let invalid = StructureResult::Invalid { reason: StructureFailure::NoBos };
        let json = serde_json::to_value(invalid).unwrap();
        assert_eq!(json["status"], "invalid");
        assert_eq!(json["reason"], "no_bos");
        assert!(json.get("zone").is_none());
    }
}

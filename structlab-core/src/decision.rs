//! Decision fusion: pair structure, index confirmation and entry candle
//! combined into one trade-allowed / disallowed verdict.
//!
//! Everything here is a pure function of already-fetched candle windows.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::alignment::{evaluate_alignment, AlignmentResult};
use crate::domain::{Candle, Direction, SymbolError, Timeframe};
use crate::index_filter::{index_confirms_pair, IndexConfirmation, IndexRejection};
use crate::patterns::validate_entry_candle;
use crate::structure::{StructureEvaluator, StructureResult, StructureZone};

/// Candle window for one timeframe of one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSeries {
    pub timeframe: Timeframe,
    pub candles: Vec<Candle>,
}

/// Per-timeframe structure of one symbol together with its alignment.
///
/// Built only through the constructors, so the alignment always matches
/// the results it was derived from.
#[derive(Debug, Clone, PartialEq)]
pub struct PairStructure {
    series: Vec<TimeframeSeries>,
    results: Vec<(Timeframe, StructureResult)>,
    alignment: AlignmentResult,
}

impl PairStructure {
    /// Evaluate every series in order.
    pub fn evaluate(series: Vec<TimeframeSeries>, evaluator: &StructureEvaluator) -> Self {
        let results = series
            .iter()
            .map(|s| (s.timeframe, evaluator.evaluate(&s.candles, s.timeframe)))
            .collect();
        Self::from_results(series, results)
    }

    /// Assemble from results computed elsewhere (e.g. in parallel).
    pub fn from_results(
        series: Vec<TimeframeSeries>,
        results: Vec<(Timeframe, StructureResult)>,
    ) -> Self {
        let alignment = evaluate_alignment(&results);
        Self { series, results, alignment }
    }

    pub fn series(&self) -> &[TimeframeSeries] {
        &self.series
    }

    pub fn results(&self) -> &[(Timeframe, StructureResult)] {
        &self.results
    }

    pub fn alignment(&self) -> &AlignmentResult {
        &self.alignment
    }

    pub fn result_for(&self, timeframe: Timeframe) -> Option<&StructureResult> {
        self.results.iter().find(|(tf, _)| *tf == timeframe).map(|(_, r)| r)
    }

    pub fn candles_for(&self, timeframe: Timeframe) -> Option<&[Candle]> {
        self.series
            .iter()
            .find(|s| s.timeframe == timeframe)
            .map(|s| s.candles.as_slice())
    }

    /// First aligned timeframe (in caller order) that carries a zone.
    pub fn selected_zone(&self) -> Option<&StructureZone> {
        self.alignment
            .timeframes()
            .iter()
            .find_map(|tf| self.result_for(*tf).and_then(StructureResult::zone))
    }
}

/// Why no trade is allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RejectReason {
    PairNotAligned,
    Index { rejection: IndexRejection },
    NoStructureZone,
    NoEntryCandle,
}

impl fmt::Display for RejectReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RejectReason::PairNotAligned => f.write_str("Pair structure not aligned"),
            RejectReason::Index { rejection } => write!(f, "{rejection}"),
            RejectReason::NoStructureZone => f.write_str("No valid structure zone"),
            RejectReason::NoEntryCandle => f.write_str("No valid entry candle"),
        }
    }
}

/// Zone summary handed to downstream layers.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DecisionZone {
    pub lower: f64,
    pub upper: f64,
    pub timeframe: Timeframe,
}

impl From<&StructureZone> for DecisionZone {
    fn from(zone: &StructureZone) -> Self {
        Self { lower: zone.lower, upper: zone.upper, timeframe: zone.timeframe }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TradeDecision {
    Allowed { direction: Direction, zone: DecisionZone, entry_index: usize },
    Rejected { reason: RejectReason },
}

impl TradeDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, TradeDecision::Allowed { .. })
    }

    /// Flatten into the record shape consumed by serving and logging layers.
    pub fn to_record(&self) -> DecisionRecord {
        match *self {
            TradeDecision::Allowed { direction, zone, entry_index } => DecisionRecord {
                trade_allowed: true,
                reason: None,
                direction: Some(direction),
                zone: Some(zone),
                entry_index: Some(entry_index),
            },
            TradeDecision::Rejected { reason } => DecisionRecord {
                trade_allowed: false,
                reason: Some(reason.to_string()),
                direction: None,
                zone: None,
                entry_index: None,
            },
        }
    }
}

/// Flat decision payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub trade_allowed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<Direction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub zone: Option<DecisionZone>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry_index: Option<usize>,
}

/// Fuse pair structure and index alignment into a trade decision.
///
/// 1. the pair must be aligned
/// 2. the index must confirm the pair's implied USD bias
/// 3. a zone is taken from the first aligned timeframe that has one
/// 4. the latest candle of that timeframe must be a valid entry into the zone
///
/// Only a symbol without USD at either end is an error.
pub fn decide(
    symbol: &str,
    pair: &PairStructure,
    index_alignment: &AlignmentResult,
) -> Result<TradeDecision, SymbolError> {
    let Some(direction) = pair.alignment().direction() else {
        return Ok(rejected(RejectReason::PairNotAligned));
    };

    if let IndexConfirmation::Rejected { rejection } =
        index_confirms_pair(symbol, pair.alignment(), index_alignment)?
    {
        return Ok(rejected(RejectReason::Index { rejection }));
    }

    let Some(zone) = pair.selected_zone() else {
        return Ok(rejected(RejectReason::NoStructureZone));
    };

    let candles = pair.candles_for(zone.timeframe).unwrap_or(&[]);
    let Some(entry_index) = candles.len().checked_sub(1) else {
        return Ok(rejected(RejectReason::NoEntryCandle));
    };

    if !validate_entry_candle(candles, entry_index, direction, zone.price_zone()) {
        return Ok(rejected(RejectReason::NoEntryCandle));
    }

    Ok(TradeDecision::Allowed { direction, zone: DecisionZone::from(zone), entry_index })
}

fn rejected(reason: RejectReason) -> TradeDecision {
    TradeDecision::Rejected { reason }
}

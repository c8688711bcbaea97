//! Signal runner: wires providers, structure evaluation and decision fusion.
//!
//! Three entry points:
//! - `evaluate_timeframes()`: fetch and evaluate one symbol on every timeframe.
//! - `evaluate_index()`: USD index alignment from an instrument or a basket.
//! - `index_for_pair()`: the index, fetched only once the pair is aligned.
//! - `run_signal()`: the full evaluation for one config, as a `SignalReport`.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use structlab_core::alignment::AlignmentResult;
use structlab_core::basket::usd_basket_alignment;
use structlab_core::data::{validate_series, CandleProvider, DataError};
use structlab_core::decision::{decide, DecisionRecord, PairStructure, TimeframeSeries};
use structlab_core::domain::{SymbolError, Timeframe};
use structlab_core::structure::{StructureEvaluator, StructureResult};

use crate::config::{ConfigError, IndexSource, SignalConfig};

/// Errors from the runner.
#[derive(Debug, Error)]
pub enum RunError {
    #[error("config error: {0}")]
    Config(#[from] ConfigError),
    #[error("data error for {symbol} {timeframe}: {source}")]
    Data {
        symbol: String,
        timeframe: Timeframe,
        #[source]
        source: DataError,
    },
    #[error(transparent)]
    Symbol(#[from] SymbolError),
}

/// Current schema version for persisted reports.
pub const SCHEMA_VERSION: u32 = 1;

fn default_schema_version() -> u32 {
    SCHEMA_VERSION
}

/// Per-timeframe line of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeframeSummary {
    pub timeframe: Timeframe,
    pub candles: usize,
    pub last_close: Option<f64>,
    pub result: StructureResult,
}

/// Alignment of one basket member, in USD-neutral pair terms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberAlignment {
    pub symbol: String,
    pub alignment: AlignmentResult,
}

/// Index side of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexSummary {
    pub source: String,
    pub alignment: AlignmentResult,
    /// Basket members; empty for an index instrument.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub members: Vec<MemberAlignment>,
}

/// Complete result of one signal evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReport {
    #[serde(default = "default_schema_version")]
    pub schema_version: u32,
    pub evaluated_at: DateTime<Utc>,
    pub symbol: String,
    pub config_id: String,
    pub provider: String,
    pub decision: DecisionRecord,
    pub pair_alignment: AlignmentResult,
    /// `None` when the pair was not aligned and the index was never fetched.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<IndexSummary>,
    pub timeframes: Vec<TimeframeSummary>,
}

/// Fetch and evaluate `symbol` on every timeframe.
///
/// Timeframes are evaluated in parallel; results keep the given order, which
/// is the zone-selection priority. A short series is not an error: it simply
/// evaluates to "No BOS".
pub fn evaluate_timeframes(
    provider: &dyn CandleProvider,
    symbol: &str,
    timeframes: &[Timeframe],
    count: usize,
    evaluator: &StructureEvaluator,
) -> Result<PairStructure, RunError> {
    let evaluated: Vec<(TimeframeSeries, StructureResult)> = timeframes
        .par_iter()
        .map(|&timeframe| {
            let candles = provider
                .fetch_candles(symbol, timeframe, count)
                .and_then(|candles| validate_series(&candles).map(|()| candles))
                .map_err(|source| {
                    warn!(symbol, %timeframe, provider = provider.name(), error = %source, "candle fetch failed");
                    RunError::Data { symbol: symbol.to_string(), timeframe, source }
                })?;

            if candles.len() < evaluator.min_candles() {
                warn!(
                    symbol,
                    %timeframe,
                    got = candles.len(),
                    need = evaluator.min_candles(),
                    "series too short for structure"
                );
            }

            let result = evaluator.evaluate(&candles, timeframe);
            debug!(symbol, %timeframe, candles = candles.len(), ?result, "timeframe evaluated");
            Ok((TimeframeSeries { timeframe, candles }, result))
        })
        .collect::<Result<Vec<_>, RunError>>()?;

    let (series, results): (Vec<_>, Vec<_>) = evaluated
        .into_iter()
        .map(|(series, result)| {
            let tf = series.timeframe;
            (series, (tf, result))
        })
        .unzip();

    Ok(PairStructure::from_results(series, results))
}

/// USD index alignment from the configured source.
pub fn evaluate_index(
    provider: &dyn CandleProvider,
    source: &IndexSource,
    timeframes: &[Timeframe],
    count: usize,
    evaluator: &StructureEvaluator,
) -> Result<IndexSummary, RunError> {
    match source {
        IndexSource::Instrument { symbol } => {
            let pair = evaluate_timeframes(provider, symbol, timeframes, count, evaluator)?;
            Ok(IndexSummary {
                source: source.label(),
                alignment: pair.alignment().clone(),
                members: Vec::new(),
            })
        }
        IndexSource::Basket { pairs } => {
            let members = pairs
                .iter()
                .map(|symbol| {
                    let pair = evaluate_timeframes(provider, symbol, timeframes, count, evaluator)?;
                    Ok(MemberAlignment { symbol: symbol.clone(), alignment: pair.alignment().clone() })
                })
                .collect::<Result<Vec<_>, RunError>>()?;

            let votes: Vec<(&str, AlignmentResult)> = members
                .iter()
                .map(|m| (m.symbol.as_str(), m.alignment.clone()))
                .collect();
            let alignment = usd_basket_alignment(&votes)?;
            Ok(IndexSummary { source: source.label(), alignment, members })
        }
    }
}

/// Index alignment for an already evaluated pair.
///
/// An unaligned pair is rejected before the index matters, so the index is
/// not fetched at all and `None` is returned.
pub fn index_for_pair(
    provider: &dyn CandleProvider,
    pair: &PairStructure,
    source: &IndexSource,
    timeframes: &[Timeframe],
    count: usize,
    evaluator: &StructureEvaluator,
) -> Result<Option<IndexSummary>, RunError> {
    if !pair.alignment().is_aligned() {
        debug!(index = %source.label(), "pair not aligned, index skipped");
        return Ok(None);
    }
    evaluate_index(provider, source, timeframes, count, evaluator).map(Some)
}

/// Evaluate one config end to end, stamped with the current time.
pub fn run_signal(config: &SignalConfig, provider: &dyn CandleProvider) -> Result<SignalReport, RunError> {
    run_signal_at(config, provider, Utc::now())
}

/// Evaluate one config end to end with an explicit evaluation time.
pub fn run_signal_at(
    config: &SignalConfig,
    provider: &dyn CandleProvider,
    evaluated_at: DateTime<Utc>,
) -> Result<SignalReport, RunError> {
    config.validate()?;
    let evaluator = config.evaluator()?;
    let config_id = config.config_id();

    let pair = evaluate_timeframes(
        provider,
        &config.symbol,
        &config.timeframes,
        config.candle_count,
        &evaluator,
    )?;
    let index = index_for_pair(
        provider,
        &pair,
        &config.index,
        &config.timeframes,
        config.candle_count,
        &evaluator,
    )?;

    let index_alignment =
        index.as_ref().map_or(AlignmentResult::NotAligned, |i| i.alignment.clone());
    let decision = decide(&config.symbol, &pair, &index_alignment)?;
    let record = decision.to_record();

    info!(
        symbol = %config.symbol,
        config = config_id.short(),
        index = index.as_ref().map_or("skipped", |i| i.source.as_str()),
        allowed = record.trade_allowed,
        reason = record.reason.as_deref().unwrap_or("-"),
        "signal evaluated"
    );

    let timeframes = pair
        .series()
        .iter()
        .zip(pair.results())
        .map(|(series, (timeframe, result))| TimeframeSummary {
            timeframe: *timeframe,
            candles: series.candles.len(),
            last_close: series.candles.last().map(|c| c.close),
            result: *result,
        })
        .collect();

    Ok(SignalReport {
        schema_version: SCHEMA_VERSION,
        evaluated_at,
        symbol: config.symbol.clone(),
        config_id: config_id.0,
        provider: provider.name().to_string(),
        decision: record,
        pair_alignment: pair.alignment().clone(),
        index,
        timeframes,
    })
}

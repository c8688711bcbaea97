//! StructLab Core: market structure analysis and trade-decision fusion.
//!
//! This crate contains the decision engine:
//! - Domain types (candles, timeframes, directions, USD position)
//! - Candle pattern library (big shadow, morning/evening star, zone touch)
//! - Single-timeframe structure pipeline (swings, BOS, failure, zone)
//! - Multi-timeframe alignment and USD index confirmation
//! - Synthetic USD basket
//! - Decision fusion into a flat decision record
//! - Candle providers (CSV, Twelve Data, synthetic)
//!
//! Everything except the providers is pure: no I/O, no clocks, no logging.

pub mod alignment;
pub mod basket;
pub mod data;
pub mod decision;
pub mod domain;
pub mod index_filter;
pub mod patterns;
pub mod structure;

pub use alignment::{evaluate_alignment, AlignmentResult};
pub use basket::{usd_basket_alignment, usd_basket_bias, USD_BASKET};
pub use decision::{decide, DecisionRecord, PairStructure, TimeframeSeries, TradeDecision};
pub use index_filter::{index_confirms_pair, IndexConfirmation};
pub use structure::{StructureEvaluator, StructureResult};

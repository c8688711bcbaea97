//! Market structure pipeline for a single timeframe.
//!
//! swings -> break of structure -> failure confirmation -> zone

pub mod bos;
pub mod evaluator;
pub mod failure;
pub mod swing;
pub mod zone;

pub use bos::{detect_bos, BosEvent};
pub use evaluator::{
    evaluate_structure, ConfirmationRule, StructureConfigError, StructureEvaluator,
    StructureFailure, StructureResult,
};
pub use failure::{detect_failure, AlwaysConfirm, FailureConfirmation, PatternConfirmation};
pub use swing::{detect_swings, SwingPoint, SwingSet, DEFAULT_LOOKBACK};
pub use zone::{build_zone, StructureZone};

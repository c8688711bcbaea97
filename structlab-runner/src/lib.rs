//! StructLab Runner: signal orchestration, watch mode, decision log.
//!
//! This crate builds on `structlab-core` to provide:
//! - TOML signal configuration with fail-fast validation and content ids
//! - Parallel multi-timeframe evaluation of a pair and its USD index
//! - Signal reports combining decision, alignment and per-timeframe verdicts
//! - Watch mode (fixed-interval re-evaluation)
//! - Daily JSONL decision log

pub mod config;
pub mod decision_log;
pub mod runner;
pub mod watch;

pub use config::{ConfigError, IndexSource, ProviderConfig, SignalConfig};
pub use decision_log::{DecisionLog, ErrorEntry, LogEntry};
pub use runner::{
    evaluate_index, evaluate_timeframes, index_for_pair, run_signal, run_signal_at, IndexSummary,
    MemberAlignment, RunError, SignalReport, TimeframeSummary,
};
pub use watch::{run_watch, WatchError, WatchOptions, WatchSummary};

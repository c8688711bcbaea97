//! Watch mode: re-evaluate one config on a fixed interval and append every
//! outcome to the decision log.
//!
//! A failed evaluation is logged as an error entry and the loop carries on;
//! only a failure to write the log itself stops it.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use structlab_core::data::CandleProvider;

use crate::config::SignalConfig;
use crate::decision_log::DecisionLog;
use crate::runner::{run_signal, RunError, SignalReport};

/// Default pause between evaluations.
pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(15 * 60);

const SLEEP_SLICE: Duration = Duration::from_millis(250);

#[derive(Debug, Error)]
pub enum WatchError {
    #[error("decision log write failed: {0}")]
    Log(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WatchOptions {
    pub interval: Duration,
    /// Stop after this many evaluations; `None` runs until cancelled.
    pub iterations: Option<usize>,
}

impl Default for WatchOptions {
    fn default() -> Self {
        Self { interval: DEFAULT_INTERVAL, iterations: None }
    }
}

/// Counters for a finished watch session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WatchSummary {
    pub iterations: usize,
    pub decisions: usize,
    pub allowed: usize,
    pub errors: usize,
}

/// Run the watch loop.
///
/// `on_report` sees every outcome before it is logged. `cancel` is checked
/// between evaluations and while sleeping.
pub fn run_watch(
    config: &SignalConfig,
    provider: &dyn CandleProvider,
    log: &DecisionLog,
    opts: WatchOptions,
    on_report: Option<&dyn Fn(&Result<SignalReport, RunError>)>,
    cancel: Option<&AtomicBool>,
) -> Result<WatchSummary, WatchError> {
    let cancelled = || cancel.is_some_and(|f| f.load(Ordering::Relaxed));
    let mut summary = WatchSummary::default();

    info!(
        symbol = %config.symbol,
        interval_secs = opts.interval.as_secs(),
        iterations = ?opts.iterations,
        log_dir = %log.dir().display(),
        "watch started"
    );

    loop {
        if cancelled() || opts.iterations.is_some_and(|max| summary.iterations >= max) {
            break;
        }

        let outcome = run_signal(config, provider);
        if let Some(cb) = on_report {
            cb(&outcome);
        }
        summary.iterations += 1;

        match outcome {
            Ok(report) => {
                summary.decisions += 1;
                if report.decision.trade_allowed {
                    summary.allowed += 1;
                }
                log.append(&report)?;
            }
            Err(e) => {
                summary.errors += 1;
                warn!(symbol = %config.symbol, error = %e, "evaluation failed");
                log.append_error(Utc::now(), e.to_string())?;
            }
        }

        if opts.iterations.is_some_and(|max| summary.iterations >= max) {
            break;
        }
        sleep_unless_cancelled(opts.interval, &cancelled);
    }

    info!(
        iterations = summary.iterations,
        allowed = summary.allowed,
        errors = summary.errors,
        "watch finished"
    );
    Ok(summary)
}

fn sleep_unless_cancelled(total: Duration, cancelled: &dyn Fn() -> bool) {
    let start = Instant::now();
    while !cancelled() {
        let remaining = total.saturating_sub(start.elapsed());
        if remaining.is_zero() {
            break;
        }
        std::thread::sleep(remaining.min(SLEEP_SLICE));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ProviderConfig;
    use crate::decision_log::LogEntry;
    use std::cell::Cell;
    use structlab_core::data::{DataError, SyntheticProvider};
    use structlab_core::domain::{Candle, Timeframe};

    struct Offline;

    impl CandleProvider for Offline {
        fn name(&self) -> &str {
            "offline"
        }

        fn fetch_candles(&self, _: &str, _: Timeframe, _: usize) -> Result<Vec<Candle>, DataError> {
            Err(DataError::NetworkUnreachable("offline".into()))
        }
    }

    fn config() -> SignalConfig {
        let mut config = SignalConfig::for_symbol("EUR/USD");
        config.provider = ProviderConfig::Synthetic { seed: 3 };
        config
    }

    fn quick(iterations: usize) -> WatchOptions {
        WatchOptions { interval: Duration::ZERO, iterations: Some(iterations) }
    }

    #[test]
    fn bounded_run_logs_every_decision() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionLog::new(dir.path());
        let seen = Cell::new(0);
        let cb = |_: &Result<SignalReport, RunError>| seen.set(seen.get() + 1);

        let summary = run_watch(&config(), &SyntheticProvider::new(3), &log, quick(2), Some(&cb), None).unwrap();

        assert_eq!(summary.iterations, 2);
        assert_eq!(summary.decisions, 2);
        assert_eq!(summary.errors, 0);
        assert_eq!(seen.get(), 2);
        let entries = log.read_day(Utc::now().date_naive()).unwrap();
        assert!(entries.iter().filter(|e| matches!(e, LogEntry::Decision(_))).count() >= 2);
    }

    #[test]
    fn failures_become_error_entries() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionLog::new(dir.path());

        let summary = run_watch(&config(), &Offline, &log, quick(3), None, None).unwrap();

        assert_eq!(summary.errors, 3);
        assert_eq!(summary.decisions, 0);
        let entries = log.read_day(Utc::now().date_naive()).unwrap();
        assert!(entries.iter().any(|e| match e {
            LogEntry::Error(err) => err.error.contains("offline"),
            LogEntry::Decision(_) => false,
        }));
    }

    #[test]
    fn cancelled_before_start_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let log = DecisionLog::new(dir.path());
        let cancel = AtomicBool::new(true);
        let summary =
            run_watch(&config(), &SyntheticProvider::new(3), &log, WatchOptions::default(), None, Some(&cancel))
                .unwrap();
        assert_eq!(summary, WatchSummary::default());
    }
}

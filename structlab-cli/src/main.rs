//! StructLab CLI: signal, structure, watch and config commands.
//!
//! Commands:
//! - `signal`: evaluate one config and print the report as JSON
//! - `structure`: evaluate a single CSV series and print its verdict
//! - `watch`: re-evaluate on an interval and append to the decision log
//! - `init-config`: write a default config file
//!
//! Logs go to stderr (`RUST_LOG` overrides the default `structlab=info`);
//! stdout carries only JSON.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::EnvFilter;

use structlab_core::data::read_candles_csv;
use structlab_core::domain::Timeframe;
use structlab_core::structure::{ConfirmationRule, StructureEvaluator, DEFAULT_LOOKBACK};
use structlab_runner::{run_signal, run_watch, DecisionLog, SignalConfig, WatchOptions};

#[derive(Parser)]
#[command(
    name = "structlab",
    about = "StructLab CLI: multi-timeframe market structure trade filter"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a signal config once and print the report as JSON.
    Signal {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Also append the report to the decision log.
        #[arg(long, default_value_t = false)]
        log: bool,
    },
    /// Evaluate one CSV candle series and print the structure result.
    Structure {
        /// CSV file with header timestamp,open,high,low,close[,volume].
        #[arg(long)]
        csv: PathBuf,

        /// Timeframe label recorded in the zone (e.g. 1h, 30m, 15m).
        #[arg(long)]
        timeframe: Timeframe,

        /// Swing lookback.
        #[arg(long, default_value_t = DEFAULT_LOOKBACK)]
        lookback: usize,

        /// Failure confirmation rule.
        #[arg(long, value_enum, default_value_t = Confirmation::PassThrough)]
        confirmation: Confirmation,
    },
    /// Re-evaluate a signal config on a fixed interval, logging every outcome.
    Watch {
        /// Path to a TOML config file.
        #[arg(long)]
        config: PathBuf,

        /// Minutes between evaluations.
        #[arg(long, default_value_t = 15)]
        interval_mins: u64,

        /// Stop after this many evaluations (default: run until killed).
        #[arg(long)]
        iterations: Option<usize>,
    },
    /// Write a default config file for a symbol.
    InitConfig {
        /// Destination path.
        path: PathBuf,

        /// Symbol to evaluate.
        #[arg(long, default_value = "EUR/USD")]
        symbol: String,

        /// Overwrite an existing file.
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum Confirmation {
    PassThrough,
    CandlePattern,
}

impl From<Confirmation> for ConfirmationRule {
    fn from(c: Confirmation) -> Self {
        match c {
            Confirmation::PassThrough => ConfirmationRule::PassThrough,
            Confirmation::CandlePattern => ConfirmationRule::CandlePattern,
        }
    }
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    init_tracing()?;

    let cli = Cli::parse();

    match cli.command {
        Commands::Signal { config, log } => run_signal_cmd(&config, log),
        Commands::Structure { csv, timeframe, lookback, confirmation } => {
            run_structure_cmd(&csv, timeframe, lookback, confirmation.into())
        }
        Commands::Watch { config, interval_mins, iterations } => {
            run_watch_cmd(&config, interval_mins, iterations)
        }
        Commands::InitConfig { path, symbol, force } => run_init_config(&path, &symbol, force),
    }
}

fn init_tracing() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("structlab=info".parse()?))
        .with_writer(std::io::stderr)
        .init();
    Ok(())
}

fn load_config(path: &Path) -> Result<SignalConfig> {
    SignalConfig::from_file(path).with_context(|| format!("loading {}", path.display()))
}

fn run_signal_cmd(config_path: &Path, log: bool) -> Result<()> {
    let config = load_config(config_path)?;
    let provider = config.provider.build()?;

    let report = run_signal(&config, provider.as_ref())?;

    if log {
        let path = DecisionLog::new(&config.log_dir).append(&report)?;
        info!(path = %path.display(), "report appended");
    }

    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

fn run_structure_cmd(
    csv: &Path,
    timeframe: Timeframe,
    lookback: usize,
    rule: ConfirmationRule,
) -> Result<()> {
    let candles = read_candles_csv(csv).with_context(|| format!("reading {}", csv.display()))?;
    let evaluator = StructureEvaluator::new(lookback, rule)?;
    if candles.len() < evaluator.min_candles() {
        info!(got = candles.len(), need = evaluator.min_candles(), "series too short for structure");
    }

    let result = evaluator.evaluate(&candles, timeframe);
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

fn run_watch_cmd(config_path: &Path, interval_mins: u64, iterations: Option<usize>) -> Result<()> {
    if iterations == Some(0) {
        bail!("--iterations must be at least 1");
    }
    let interval = watch_interval(interval_mins)?;
    let config = load_config(config_path)?;
    let provider = config.provider.build()?;
    let log = DecisionLog::new(&config.log_dir);
    let opts = WatchOptions { interval, iterations };

    let print = |outcome: &Result<structlab_runner::SignalReport, structlab_runner::RunError>| {
        if let Ok(report) = outcome {
            match serde_json::to_string(&report.decision) {
                Ok(line) => println!("{} {line}", report.evaluated_at.to_rfc3339()),
                Err(e) => tracing::warn!(error = %e, "could not render decision"),
            }
        }
    };

    let summary = run_watch(&config, provider.as_ref(), &log, opts, Some(&print), None)?;
    info!(
        iterations = summary.iterations,
        allowed = summary.allowed,
        errors = summary.errors,
        "watch done"
    );
    Ok(())
}

fn watch_interval(interval_mins: u64) -> Result<Duration> {
    if interval_mins == 0 {
        bail!("--interval-mins must be at least 1");
    }
    let Some(secs) = interval_mins.checked_mul(60) else {
        bail!("--interval-mins {interval_mins} is too large");
    };
    Ok(Duration::from_secs(secs))
}

fn run_init_config(path: &Path, symbol: &str, force: bool) -> Result<()> {
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }
    let config = SignalConfig::for_symbol(symbol);
    config.validate()?;

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, config.to_toml()?)?;
    let id = config.config_id();
    info!(path = %path.display(), config = id.short(), "config written");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn structure_args_parse() {
        let cli = Cli::try_parse_from([
            "structlab",
            "structure",
            "--csv",
            "EURUSD_1h.csv",
            "--timeframe",
            "1h",
            "--confirmation",
            "candle-pattern",
        ])
        .unwrap();
        match cli.command {
            Commands::Structure { timeframe, lookback, confirmation, .. } => {
                assert_eq!(timeframe, Timeframe::H1);
                assert_eq!(lookback, 3);
                assert_eq!(ConfirmationRule::from(confirmation), ConfirmationRule::CandlePattern);
            }
            _ => panic!("expected structure command"),
        }
    }

    #[test]
    fn watch_interval_is_checked() {
        assert_eq!(watch_interval(15).unwrap(), Duration::from_secs(900));
        assert!(watch_interval(0).is_err());
        assert!(watch_interval(u64::MAX).is_err());
    }

    #[test]
    fn watch_rejects_zero_interval_before_loading_config() {
        let err = run_watch_cmd(Path::new("does-not-exist.toml"), 0, None).unwrap_err();
        assert!(err.to_string().contains("--interval-mins"));
    }

    #[test]
    fn init_config_writes_a_loadable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("conf/usdjpy.toml");
        run_init_config(&path, "USD/JPY", false).unwrap();

        let config = SignalConfig::from_file(&path).unwrap();
        assert_eq!(config.symbol, "USD/JPY");

        assert!(run_init_config(&path, "USD/JPY", false).is_err());
        assert!(run_init_config(&path, "USD/JPY", true).is_ok());
    }

    #[test]
    fn init_config_rejects_non_usd_symbols() {
        let dir = tempfile::tempdir().unwrap();
        assert!(run_init_config(&dir.path().join("x.toml"), "EUR/GBP", false).is_err());
    }
}

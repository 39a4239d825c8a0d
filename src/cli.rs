//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvAdapter;
use crate::adapters::csv_export::{write_equity, write_trades};
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::text_report::TextReportAdapter;
use crate::domain::backtest::{self as backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    optional_date, pnl_formula, signal_source_kind, validate_config,
};
use crate::domain::error::SigtraderError;
use crate::domain::execution::{
    ExecutionConfig, DEFAULT_COMMISSION_RATE, DEFAULT_INITIAL_CASH, DEFAULT_RISK_FRACTION,
};
use crate::domain::metrics::{
    AnalysisConfig, PerformanceReport, DEFAULT_PERIODS_PER_YEAR, DEFAULT_RISK_FREE_RATE,
};
use crate::domain::signal::{
    SignalSource, SignalSourceKind, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW,
};
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::DataPort;
use crate::ports::report_port::ReportPort;

#[derive(Parser, Debug)]
#[command(name = "sigtrader", about = "Signal-driven single-instrument backtester")]
pub struct Cli {
    /// Log verbosity (RUST_LOG overrides)
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogLevel {
    Error,
    #[default]
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> &'static str {
        match self {
            LogLevel::Error => "error",
            LogLevel::Warn => "warn",
            LogLevel::Info => "info",
            LogLevel::Debug => "debug",
            LogLevel::Trace => "trace",
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        /// Bar CSV file, or a directory holding `<instrument>.csv`
        #[arg(short, long)]
        data: Option<PathBuf>,
        #[arg(long)]
        instrument: Option<String>,
        #[arg(long)]
        trades_out: Option<PathBuf>,
        #[arg(long)]
        equity_out: Option<PathBuf>,
        #[arg(long)]
        dry_run: bool,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

/// Where a finished run writes its artefacts.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputPaths {
    /// Summary destination; `-` is stdout.
    pub summary: String,
    pub trades: Option<PathBuf>,
    pub equity: Option<PathBuf>,
}

pub fn run(cli: Cli) -> ExitCode {
    let outcome = match cli.command {
        Command::Backtest {
            config,
            data,
            instrument,
            trades_out,
            equity_out,
            dry_run,
        } => {
            if dry_run {
                run_dry_run(&config, data.as_deref(), instrument.as_deref())
            } else {
                run_backtest(
                    &config,
                    data.as_deref(),
                    instrument.as_deref(),
                    trades_out,
                    equity_out,
                )
            }
        }
        Command::Validate { config } => run_validate(&config),
    };

    match outcome {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e}");
            (&e).into()
        }
    }
}

pub fn load_config(path: &Path) -> Result<FileConfigAdapter, SigtraderError> {
    eprintln!("Loading config from {}", path.display());
    let adapter = FileConfigAdapter::from_file(path)?;
    validate_config(&adapter)?;
    Ok(adapter)
}

/// Build the run configuration. `instrument_override` wins over `[backtest] instrument`.
pub fn build_backtest_config(
    adapter: &dyn ConfigPort,
    instrument_override: Option<&str>,
) -> Result<BacktestConfig, SigtraderError> {
    let instrument = match instrument_override {
        Some(i) => i.to_string(),
        None => adapter.get_string("backtest", "instrument").ok_or_else(|| {
            SigtraderError::ConfigMissing {
                section: "backtest".into(),
                key: "instrument".into(),
            }
        })?,
    };

    let signal = match signal_source_kind(adapter)? {
        SignalSourceKind::Column => SignalSource::Column,
        SignalSourceKind::SmaCrossover => SignalSource::SmaCrossover {
            short_window: window(adapter, "short_window", DEFAULT_SHORT_WINDOW)?,
            long_window: window(adapter, "long_window", DEFAULT_LONG_WINDOW)?,
        },
    };

    Ok(BacktestConfig {
        instrument,
        start_date: optional_date(adapter, "start_date")?,
        end_date: optional_date(adapter, "end_date")?,
        execution: ExecutionConfig {
            initial_cash: adapter.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH)?,
            risk_fraction: adapter.get_double(
                "backtest",
                "risk_fraction",
                DEFAULT_RISK_FRACTION,
            )?,
            commission_rate: adapter.get_double(
                "backtest",
                "commission_rate",
                DEFAULT_COMMISSION_RATE,
            )?,
        },
        analysis: AnalysisConfig {
            risk_free_rate: adapter.get_double(
                "backtest",
                "risk_free_rate",
                DEFAULT_RISK_FREE_RATE,
            )?,
            periods_per_year: adapter.get_double(
                "backtest",
                "periods_per_year",
                DEFAULT_PERIODS_PER_YEAR,
            )?,
            pnl_formula: pnl_formula(adapter)?,
        },
        signal,
    })
}

fn window(adapter: &dyn ConfigPort, key: &str, default: usize) -> Result<usize, SigtraderError> {
    let value = adapter.get_int("signal", key, default as i64)?;
    usize::try_from(value).map_err(|_| SigtraderError::ConfigInvalid {
        section: "signal".into(),
        key: key.into(),
        reason: format!("{key} must be non-negative"),
    })
}

/// `--data` wins over `[backtest] data_path`.
pub fn resolve_data_path(
    adapter: &dyn ConfigPort,
    data_override: Option<&Path>,
) -> Result<PathBuf, SigtraderError> {
    match data_override {
        Some(p) => Ok(p.to_path_buf()),
        None => adapter
            .get_string("backtest", "data_path")
            .map(PathBuf::from)
            .ok_or_else(|| SigtraderError::ConfigMissing {
                section: "backtest".into(),
                key: "data_path".into(),
            }),
    }
}

fn resolve_output(
    adapter: &dyn ConfigPort,
    key: &str,
    cli_override: Option<PathBuf>,
) -> Option<PathBuf> {
    cli_override.or_else(|| adapter.get_string("report", key).map(PathBuf::from))
}

fn run_backtest(
    config_path: &Path,
    data_override: Option<&Path>,
    instrument_override: Option<&str>,
    trades_out: Option<PathBuf>,
    equity_out: Option<PathBuf>,
) -> Result<(), SigtraderError> {
    let adapter = load_config(config_path)?;
    let bt_config = build_backtest_config(&adapter, instrument_override)?;
    let data_path = resolve_data_path(&adapter, data_override)?;

    let outputs = OutputPaths {
        summary: "-".to_string(),
        trades: resolve_output(&adapter, "trades_output", trades_out),
        equity: resolve_output(&adapter, "equity_output", equity_out),
    };

    eprintln!("Loading bars from {}", data_path.display());
    let data_port = CsvAdapter::new(data_path);
    run_backtest_pipeline(&data_port, &TextReportAdapter, &bt_config, &outputs)?;
    Ok(())
}

/// Fetch bars, run the engine, and write the summary plus any CSV exports.
pub fn run_backtest_pipeline(
    data_port: &dyn DataPort,
    report_port: &dyn ReportPort,
    bt_config: &BacktestConfig,
    outputs: &OutputPaths,
) -> Result<PerformanceReport, SigtraderError> {
    let bars = data_port.fetch_bars(
        &bt_config.instrument,
        bt_config.start_date,
        bt_config.end_date,
    )?;

    eprintln!(
        "Running backtest: {} ({} bars, signal {})",
        bt_config.instrument,
        bars.len(),
        bt_config.signal
    );

    let result = backtest_engine::run_backtest(&bars, bt_config)?;
    let report = result.report(&bt_config.analysis);

    report_port.write(&result, &report, &outputs.summary)?;

    if let Some(path) = &outputs.trades {
        write_trades(&result.ledger, path)?;
        eprintln!("Trades written to: {}", path.display());
    }
    if let Some(path) = &outputs.equity {
        write_equity(result.portfolio.equity_curve(), path)?;
        eprintln!("Equity curve written to: {}", path.display());
    }

    Ok(report)
}

fn print_parameters(bt_config: &BacktestConfig) {
    let date_or_open = |d: Option<chrono::NaiveDate>| {
        d.map(|d| d.to_string()).unwrap_or_else(|| "open".to_string())
    };

    eprintln!("\nParameters:");
    eprintln!("  instrument:       {}", bt_config.instrument);
    eprintln!("  start_date:       {}", date_or_open(bt_config.start_date));
    eprintln!("  end_date:         {}", date_or_open(bt_config.end_date));
    eprintln!("  initial_cash:     {}", bt_config.execution.initial_cash);
    eprintln!("  risk_fraction:    {}", bt_config.execution.risk_fraction);
    eprintln!("  commission_rate:  {}", bt_config.execution.commission_rate);
    eprintln!("  risk_free_rate:   {}", bt_config.analysis.risk_free_rate);
    eprintln!("  periods_per_year: {}", bt_config.analysis.periods_per_year);
    eprintln!("  signal:           {}", bt_config.signal);
    eprintln!("  pnl_formula:      {}", bt_config.analysis.pnl_formula);
}

pub fn run_dry_run(
    config_path: &Path,
    data_override: Option<&Path>,
    instrument_override: Option<&str>,
) -> Result<(), SigtraderError> {
    let adapter = load_config(config_path)?;
    let bt_config = build_backtest_config(&adapter, instrument_override)?;
    let data_path = resolve_data_path(&adapter, data_override)?;
    eprintln!("Config validated successfully");

    print_parameters(&bt_config);
    eprintln!("  data:             {}", data_path.display());

    eprintln!("\nDry run complete: configuration is valid");
    Ok(())
}

pub fn run_validate(config_path: &Path) -> Result<(), SigtraderError> {
    let adapter = load_config(config_path)?;
    let bt_config = build_backtest_config(&adapter, None)?;
    eprintln!("Config validated successfully");

    print_parameters(&bt_config);
    Ok(())
}

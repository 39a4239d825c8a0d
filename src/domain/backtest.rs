//! Backtest configuration, result, and the run entry point.

use chrono::NaiveDate;

use super::bar::PriceBar;
use super::error::SigtraderError;
use super::execution::{BacktestEngine, ExecutionConfig};
use super::metrics::{AnalysisConfig, PerformanceReport};
use super::portfolio::Portfolio;
use super::signal::{resolve_signals, SignalSource};
use super::trade::TradeLedger;

#[derive(Debug, Clone, PartialEq)]
pub struct BacktestConfig {
    pub instrument: String,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub execution: ExecutionConfig,
    pub analysis: AnalysisConfig,
    pub signal: SignalSource,
}

impl BacktestConfig {
    pub fn new(instrument: impl Into<String>) -> Self {
        BacktestConfig {
            instrument: instrument.into(),
            start_date: None,
            end_date: None,
            execution: ExecutionConfig::default(),
            analysis: AnalysisConfig::default(),
            signal: SignalSource::default(),
        }
    }
}

/// Final state of a finished run.
#[derive(Debug, Clone, PartialEq)]
pub struct BacktestResult {
    pub instrument: String,
    pub portfolio: Portfolio,
    pub ledger: TradeLedger,
}

impl BacktestResult {
    pub fn bar_count(&self) -> usize {
        self.portfolio.equity_curve().len()
    }

    pub fn report(&self, config: &AnalysisConfig) -> PerformanceReport {
        PerformanceReport::compute(
            &self.ledger,
            self.portfolio.equity_curve(),
            self.portfolio.initial_cash(),
            config,
        )
    }
}

/// Resolve signals for `price_bars` and run the engine over them.
pub fn run_backtest(
    price_bars: &[PriceBar],
    config: &BacktestConfig,
) -> Result<BacktestResult, SigtraderError> {
    let bars = resolve_signals(price_bars, &config.signal, &config.instrument)?;
    BacktestEngine::new(config.instrument.clone(), config.execution.clone()).run(&bars)
}

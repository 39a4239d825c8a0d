//! Performance metrics and statistics.
//!
//! Everything here is read-only over a finished run: the trade ledger and the
//! per-bar equity curve recorded by the engine.
//!
//! Trade PnL pairs ledger entries by position, (0,1), (2,3), …, and by default
//! evaluates `exit.price - entry.price × entry.quantity - commissions` exactly
//! as written. That precedence almost certainly intended
//! `(exit.price - entry.price) × entry.quantity`; the corrected form is
//! available as [`PnlFormula::PriceDifference`] but is never applied silently.

use std::fmt;
use std::str::FromStr;

use tracing::warn;

use super::portfolio::EquityPoint;
use super::trade::{TradeLedger, TradeRecord};

pub const DEFAULT_RISK_FREE_RATE: f64 = 0.02;
pub const DEFAULT_PERIODS_PER_YEAR: f64 = 252.0;

/// How a positional (entry, exit) pair is turned into a PnL figure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PnlFormula {
    /// `exit.price - entry.price × entry.quantity - commissions`.
    #[default]
    Positional,
    /// `(exit.price - entry.price) × entry.quantity - commissions`.
    PriceDifference,
}

impl PnlFormula {
    pub fn pair_pnl(self, entry: &TradeRecord, exit: &TradeRecord) -> f64 {
        let commissions = entry.commission + exit.commission;
        match self {
            PnlFormula::Positional => exit.price - entry.price * entry.quantity - commissions,
            PnlFormula::PriceDifference => {
                (exit.price - entry.price) * entry.quantity - commissions
            }
        }
    }
}

impl fmt::Display for PnlFormula {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PnlFormula::Positional => f.write_str("positional"),
            PnlFormula::PriceDifference => f.write_str("price_difference"),
        }
    }
}

impl FromStr for PnlFormula {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "positional" => Ok(PnlFormula::Positional),
            "price_difference" => Ok(PnlFormula::PriceDifference),
            other => Err(format!(
                "unknown pnl formula '{other}' (expected positional or price_difference)"
            )),
        }
    }
}

/// Parameters for the statistics pass.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalysisConfig {
    pub risk_free_rate: f64,
    pub periods_per_year: f64,
    pub pnl_formula: PnlFormula,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        AnalysisConfig {
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
            periods_per_year: DEFAULT_PERIODS_PER_YEAR,
            pnl_formula: PnlFormula::default(),
        }
    }
}

/// Aggregate over positional trade pairs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TradeStats {
    pub pairs: usize,
    pub total_pnl: f64,
    pub avg_trade_pnl: f64,
    pub win_ratio: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PerformanceReport {
    pub pnl_formula: PnlFormula,
    pub trade_pairs: usize,
    pub total_pnl: f64,
    pub avg_trade_pnl: f64,
    pub win_ratio: f64,
    pub initial_value: f64,
    pub final_value: f64,
    pub bar_count: usize,
    pub total_return: f64,
    pub annualized_return: f64,
    pub volatility: f64,
    /// `None` when volatility is zero.
    pub sharpe_ratio: Option<f64>,
    pub max_drawdown: f64,
    pub cagr: f64,
}

impl PerformanceReport {
    pub fn compute(
        ledger: &TradeLedger,
        equity_curve: &[EquityPoint],
        initial_value: f64,
        config: &AnalysisConfig,
    ) -> Self {
        let trades = trade_stats(ledger, config.pnl_formula);

        let values: Vec<f64> = equity_curve.iter().map(|p| p.value).collect();
        let bar_count = values.len();
        let final_value = values.last().copied().unwrap_or(initial_value);

        let total = total_return(initial_value, final_value);
        let annualized = annualized_return(total, bar_count, config.periods_per_year);
        let vol = volatility(&period_returns(&values), config.periods_per_year);

        PerformanceReport {
            pnl_formula: config.pnl_formula,
            trade_pairs: trades.pairs,
            total_pnl: trades.total_pnl,
            avg_trade_pnl: trades.avg_trade_pnl,
            win_ratio: trades.win_ratio,
            initial_value,
            final_value,
            bar_count,
            total_return: total,
            annualized_return: annualized,
            volatility: vol,
            sharpe_ratio: sharpe_ratio(annualized, config.risk_free_rate, vol),
            max_drawdown: max_drawdown(&values),
            cagr: cagr(initial_value, final_value, bar_count, config.periods_per_year),
        }
    }
}

/// PnL of every positional pair, in ledger order.
pub fn pair_pnls(ledger: &TradeLedger, formula: PnlFormula) -> Vec<f64> {
    if let Some(trade) = ledger.unpaired() {
        warn!(date = %trade.date, "unpaired trailing trade excluded from PnL");
    }
    ledger
        .pairs()
        .map(|(entry, exit)| formula.pair_pnl(entry, exit))
        .collect()
}

/// Total, mean and win ratio over pairs. All zero when there are no pairs.
pub fn trade_stats(ledger: &TradeLedger, formula: PnlFormula) -> TradeStats {
    let pnls = pair_pnls(ledger, formula);
    if pnls.is_empty() {
        return TradeStats::default();
    }

    let n = pnls.len() as f64;
    let total_pnl: f64 = pnls.iter().sum();
    let wins = pnls.iter().filter(|&&p| p > 0.0).count();

    TradeStats {
        pairs: pnls.len(),
        total_pnl,
        avg_trade_pnl: total_pnl / n,
        win_ratio: wins as f64 / n,
    }
}

/// Period-over-period percentage change.
pub fn period_returns(values: &[f64]) -> Vec<f64> {
    values
        .windows(2)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// Population standard deviation of `returns`, annualized by √periods_per_year.
pub fn volatility(returns: &[f64], periods_per_year: f64) -> f64 {
    if returns.is_empty() {
        return 0.0;
    }
    let n = returns.len() as f64;
    let mean = returns.iter().sum::<f64>() / n;
    let variance = returns.iter().map(|r| (r - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt() * periods_per_year.sqrt()
}

pub fn total_return(initial_value: f64, final_value: f64) -> f64 {
    if initial_value == 0.0 {
        return 0.0;
    }
    (final_value - initial_value) / initial_value
}

/// `(1 + total_return)^(periods_per_year / bar_count) - 1`, floored at -1 when
/// the run lost everything.
pub fn annualized_return(total_return: f64, bar_count: usize, periods_per_year: f64) -> f64 {
    if bar_count == 0 {
        return 0.0;
    }
    let growth = 1.0 + total_return;
    if growth <= 0.0 {
        return -1.0;
    }
    growth.powf(periods_per_year / bar_count as f64) - 1.0
}

/// Excess annualized return over volatility; `None` for zero volatility.
pub fn sharpe_ratio(annualized_return: f64, risk_free_rate: f64, volatility: f64) -> Option<f64> {
    if volatility > 0.0 && volatility.is_finite() {
        Some((annualized_return - risk_free_rate) / volatility)
    } else {
        None
    }
}

/// Most negative `(value - running_max) / running_max`. Always <= 0.
pub fn max_drawdown(values: &[f64]) -> f64 {
    let mut peak = f64::NEG_INFINITY;
    let mut max_dd = 0.0_f64;

    for &value in values {
        peak = peak.max(value);
        if peak > 0.0 {
            max_dd = max_dd.min((value - peak) / peak);
        }
    }

    max_dd
}

/// `(final / initial)^(1 / years) - 1` with `years = bar_count / periods_per_year`.
pub fn cagr(initial_value: f64, final_value: f64, bar_count: usize, periods_per_year: f64) -> f64 {
    if bar_count == 0 || initial_value <= 0.0 {
        return 0.0;
    }
    let ratio = final_value / initial_value;
    if ratio <= 0.0 {
        return -1.0;
    }
    let years = bar_count as f64 / periods_per_year;
    ratio.powf(1.0 / years) - 1.0
}

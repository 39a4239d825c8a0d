//! Plain-text summary report.
//!
//! Two blocks: a portfolio summary (cash and per-instrument positions) and
//! the performance metrics. Sharpe prints as `undefined` for zero volatility.

use std::fmt::Write as _;
use std::fs;
use std::io::Write as _;

use crate::domain::backtest::BacktestResult;
use crate::domain::error::SigtraderError;
use crate::domain::metrics::{PerformanceReport, PnlFormula};
use crate::ports::report_port::ReportPort;

/// Writes the summary to a file, or to stdout when the path is `-`.
pub struct TextReportAdapter;

pub fn format_summary(result: &BacktestResult, report: &PerformanceReport) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "--- Portfolio Summary ---");
    let _ = writeln!(out, "Instrument:         {}", result.instrument);
    let _ = writeln!(out, "Cash:               {:.2}", result.portfolio.cash());
    let _ = writeln!(out, "Positions:");
    let mut positions: Vec<(&String, &f64)> = result.portfolio.positions().iter().collect();
    positions.sort_by(|a, b| a.0.cmp(b.0));
    if positions.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (instrument, quantity) in positions {
        let _ = writeln!(out, "  {}: {:.6}", instrument, quantity);
    }
    let _ = writeln!(out, "Trades executed:    {}", result.ledger.len());

    let _ = writeln!(out);
    let _ = writeln!(out, "--- Performance Metrics ---");
    let _ = writeln!(out, "Bars:               {}", report.bar_count);
    let _ = writeln!(out, "Initial Value:      {:.2}", report.initial_value);
    let _ = writeln!(out, "Final Value:        {:.2}", report.final_value);
    let _ = writeln!(out, "Total Return:       {:.2}%", report.total_return * 100.0);
    let _ = writeln!(out, "Annualized Return:  {:.2}%", report.annualized_return * 100.0);
    let _ = writeln!(out, "Volatility:         {:.2}%", report.volatility * 100.0);
    let _ = writeln!(out, "Sharpe Ratio:       {}", format_sharpe(report.sharpe_ratio));
    let _ = writeln!(out, "Max Drawdown:       {:.2}%", report.max_drawdown * 100.0);
    let _ = writeln!(out, "CAGR:               {:.2}%", report.cagr * 100.0);
    let _ = writeln!(out, "Trade Pairs:        {}", report.trade_pairs);
    let _ = writeln!(out, "Total P&L:          {:.2}", report.total_pnl);
    let _ = writeln!(out, "Average Trade P&L:  {:.2}", report.avg_trade_pnl);
    let _ = writeln!(out, "Win Ratio:          {:.2}%", report.win_ratio * 100.0);
    let _ = writeln!(out, "P&L Formula:        {}", report.pnl_formula);
    if report.pnl_formula == PnlFormula::Positional {
        let _ = writeln!(
            out,
            "  note: computes exit.price - entry.price * quantity - commissions;"
        );
        let _ = writeln!(
            out,
            "        set [report] pnl_formula = price_difference for (exit - entry) * quantity"
        );
    }

    out
}

fn format_sharpe(sharpe: Option<f64>) -> String {
    match sharpe {
        Some(value) => format!("{:.2}", value),
        None => "undefined".to_string(),
    }
}

impl ReportPort for TextReportAdapter {
    fn write(
        &self,
        result: &BacktestResult,
        report: &PerformanceReport,
        output_path: &str,
    ) -> Result<(), SigtraderError> {
        let summary = format_summary(result, report);
        if output_path == "-" {
            std::io::stdout().write_all(summary.as_bytes())?;
        } else {
            fs::write(output_path, summary)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::backtest::{run_backtest, BacktestConfig};
    use crate::domain::bar::{PriceBar, Signal};
    use crate::domain::metrics::AnalysisConfig;
    use chrono::NaiveDate;

    fn sample_result() -> BacktestResult {
        let bars: Vec<PriceBar> = [(100.0, Signal::Long), (110.0, Signal::Short)]
            .iter()
            .enumerate()
            .map(|(i, &(close, signal))| PriceBar {
                date: NaiveDate::from_ymd_opt(2024, 1, 1 + i as u32).unwrap(),
                close,
                signal: Some(signal),
            })
            .collect();
        run_backtest(&bars, &BacktestConfig::new("SPY")).unwrap()
    }

    #[test]
    fn summary_contains_both_blocks() {
        let result = sample_result();
        let report = result.report(&AnalysisConfig::default());
        let text = format_summary(&result, &report);

        assert!(text.contains("--- Portfolio Summary ---"));
        assert!(text.contains("Cash:               1001958.00"));
        assert!(text.contains("SPY: 0.000000"));
        assert!(text.contains("--- Performance Metrics ---"));
        assert!(text.contains("Trade Pairs:        1"));
        assert!(text.contains("P&L Formula:        positional"));
        assert!(text.contains("note:"));
    }

    #[test]
    fn sharpe_formats_undefined() {
        assert_eq!(format_sharpe(None), "undefined");
        assert_eq!(format_sharpe(Some(1.234)), "1.23");
    }

    #[test]
    fn price_difference_has_no_note() {
        let result = sample_result();
        let config = AnalysisConfig {
            pnl_formula: PnlFormula::PriceDifference,
            ..AnalysisConfig::default()
        };
        let text = format_summary(&result, &result.report(&config));
        assert!(text.contains("P&L Formula:        price_difference"));
        assert!(!text.contains("note:"));
    }

    #[test]
    fn write_to_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("summary.txt");
        let result = sample_result();
        let report = result.report(&AnalysisConfig::default());

        TextReportAdapter
            .write(&result, &report, path.to_str().unwrap())
            .unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("--- Portfolio Summary ---"));
    }
}

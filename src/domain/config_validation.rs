//! Configuration validation.
//!
//! Every value is checked before a run; the first violation is returned.
//! Instrument and data path are resolved by the CLI since both may come
//! from flags instead of the file.

use crate::domain::error::SigtraderError;
use crate::domain::execution::{
    DEFAULT_COMMISSION_RATE, DEFAULT_INITIAL_CASH, DEFAULT_RISK_FRACTION,
};
use crate::domain::metrics::{PnlFormula, DEFAULT_PERIODS_PER_YEAR, DEFAULT_RISK_FREE_RATE};
use crate::domain::signal::{SignalSourceKind, DEFAULT_LONG_WINDOW, DEFAULT_SHORT_WINDOW};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDate;

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_initial_cash(config)?;
    validate_risk_fraction(config)?;
    validate_commission_rate(config)?;
    validate_risk_free_rate(config)?;
    validate_periods_per_year(config)?;
    validate_dates(config)?;
    Ok(())
}

pub fn validate_signal_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let kind = signal_source_kind(config)?;
    if kind == SignalSourceKind::SmaCrossover {
        validate_windows(config)?;
    }
    Ok(())
}

pub fn validate_report_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    pnl_formula(config)?;
    Ok(())
}

/// All three sections, in file order.
pub fn validate_config(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    validate_backtest_config(config)?;
    validate_signal_config(config)?;
    validate_report_config(config)?;
    Ok(())
}

fn invalid(section: &str, key: &str, reason: &str) -> SigtraderError {
    SigtraderError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.to_string(),
    }
}

fn validate_initial_cash(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_double("backtest", "initial_cash", DEFAULT_INITIAL_CASH)?;
    if !(value > 0.0 && value.is_finite()) {
        return Err(invalid(
            "backtest",
            "initial_cash",
            "initial_cash must be positive",
        ));
    }
    Ok(())
}

fn validate_risk_fraction(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_double("backtest", "risk_fraction", DEFAULT_RISK_FRACTION)?;
    if !(value > 0.0 && value <= 1.0) {
        return Err(invalid(
            "backtest",
            "risk_fraction",
            "risk_fraction must be in (0, 1]",
        ));
    }
    Ok(())
}

fn validate_commission_rate(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_double("backtest", "commission_rate", DEFAULT_COMMISSION_RATE)?;
    if !(value >= 0.0 && value.is_finite()) {
        return Err(invalid(
            "backtest",
            "commission_rate",
            "commission_rate must be non-negative",
        ));
    }
    Ok(())
}

fn validate_risk_free_rate(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_double("backtest", "risk_free_rate", DEFAULT_RISK_FREE_RATE)?;
    if !(0.0..1.0).contains(&value) {
        return Err(invalid(
            "backtest",
            "risk_free_rate",
            "risk_free_rate must be between 0 and 1",
        ));
    }
    Ok(())
}

fn validate_periods_per_year(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let value = config.get_double("backtest", "periods_per_year", DEFAULT_PERIODS_PER_YEAR)?;
    if !(value >= 1.0 && value.is_finite()) {
        return Err(invalid(
            "backtest",
            "periods_per_year",
            "periods_per_year must be at least 1",
        ));
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let start_date = optional_date(config, "start_date")?;
    let end_date = optional_date(config, "end_date")?;

    if let (Some(start), Some(end)) = (start_date, end_date) {
        if start >= end {
            return Err(invalid(
                "backtest",
                "start_date",
                "start_date must be before end_date",
            ));
        }
    }
    Ok(())
}

fn validate_windows(config: &dyn ConfigPort) -> Result<(), SigtraderError> {
    let short = config.get_int("signal", "short_window", DEFAULT_SHORT_WINDOW as i64)?;
    let long = config.get_int("signal", "long_window", DEFAULT_LONG_WINDOW as i64)?;
    if short < 1 {
        return Err(invalid(
            "signal",
            "short_window",
            "short_window must be at least 1",
        ));
    }
    if long <= short {
        return Err(invalid(
            "signal",
            "long_window",
            "long_window must be greater than short_window",
        ));
    }
    Ok(())
}

/// Optional `YYYY-MM-DD` key in `[backtest]`.
pub fn optional_date(
    config: &dyn ConfigPort,
    field: &str,
) -> Result<Option<NaiveDate>, SigtraderError> {
    match config.get_string("backtest", field) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(&s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| {
                invalid(
                    "backtest",
                    field,
                    &format!("invalid {} format, expected YYYY-MM-DD", field),
                )
            }),
    }
}

/// `[signal] source`, defaulting to `column`.
pub fn signal_source_kind(config: &dyn ConfigPort) -> Result<SignalSourceKind, SigtraderError> {
    match config.get_string("signal", "source") {
        None => Ok(SignalSourceKind::Column),
        Some(s) => s
            .parse()
            .map_err(|reason: String| invalid("signal", "source", &reason)),
    }
}

/// `[report] pnl_formula`, defaulting to `positional`.
pub fn pnl_formula(config: &dyn ConfigPort) -> Result<PnlFormula, SigtraderError> {
    match config.get_string("report", "pnl_formula") {
        None => Ok(PnlFormula::default()),
        Some(s) => s
            .parse()
            .map_err(|reason: String| invalid("report", "pnl_formula", &reason)),
    }
}

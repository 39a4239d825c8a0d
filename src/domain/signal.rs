//! Signal resolution: turn loaded price bars into engine bars.
//!
//! Two sources:
//! - `Column`: the data source already carries a signal per bar.
//! - `SmaCrossover`: long when SMA(short) > SMA(long), short otherwise,
//!   shifted one bar forward so bar t only sees information up to t-1.

use std::fmt;
use std::str::FromStr;

use super::bar::{Bar, PriceBar, Signal};
use super::error::SigtraderError;

pub const DEFAULT_SHORT_WINDOW: usize = 50;
pub const DEFAULT_LONG_WINDOW: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignalSource {
    #[default]
    Column,
    SmaCrossover {
        short_window: usize,
        long_window: usize,
    },
}

impl fmt::Display for SignalSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignalSource::Column => f.write_str("column"),
            SignalSource::SmaCrossover {
                short_window,
                long_window,
            } => write!(f, "sma_crossover({short_window}, {long_window})"),
        }
    }
}

/// Kind of signal source as spelled in config; windows are read separately.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignalSourceKind {
    Column,
    SmaCrossover,
}

impl FromStr for SignalSourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "column" => Ok(SignalSourceKind::Column),
            "sma_crossover" => Ok(SignalSourceKind::SmaCrossover),
            other => Err(format!(
                "unknown signal source '{other}' (expected column or sma_crossover)"
            )),
        }
    }
}

/// Simple moving average of `closes`. Entries before the window fills are `None`.
pub fn sma(closes: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; closes.len()];
    }

    let mut values = Vec::with_capacity(closes.len());
    let mut window_sum = 0.0;

    for (i, &close) in closes.iter().enumerate() {
        window_sum += close;
        if i >= period {
            window_sum -= closes[i - period];
        }
        if i + 1 >= period {
            values.push(Some(window_sum / period as f64));
        } else {
            values.push(None);
        }
    }

    values
}

/// Unshifted crossover signal per bar. Undefined averages compare as "not
/// above", which yields `Short`.
pub fn crossover_signals(closes: &[f64], short_window: usize, long_window: usize) -> Vec<Signal> {
    let short = sma(closes, short_window);
    let long = sma(closes, long_window);

    short
        .iter()
        .zip(long.iter())
        .map(|pair| match pair {
            (Some(s), Some(l)) if s > l => Signal::Long,
            _ => Signal::Short,
        })
        .collect()
}

/// Resolve each bar's signal according to `source`.
pub fn resolve_signals(
    bars: &[PriceBar],
    source: &SignalSource,
    instrument: &str,
) -> Result<Vec<Bar>, SigtraderError> {
    match *source {
        SignalSource::Column => bars
            .iter()
            .map(|b| {
                let signal = b.signal.ok_or_else(|| SigtraderError::Data {
                    reason: format!("{instrument}: missing signal on {}", b.date),
                })?;
                Ok(Bar::new(b.date, b.close, signal))
            })
            .collect(),
        SignalSource::SmaCrossover {
            short_window,
            long_window,
        } => {
            let minimum = long_window + 1;
            if bars.len() < minimum {
                return Err(SigtraderError::InsufficientData {
                    instrument: instrument.to_string(),
                    bars: bars.len(),
                    minimum,
                });
            }

            let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
            let raw = crossover_signals(&closes, short_window, long_window);

            // Bar i trades on the signal computed at i-1; bar 0 has none and is dropped.
            Ok(bars
                .iter()
                .skip(1)
                .zip(raw.iter())
                .map(|(b, &signal)| Bar::new(b.date, b.close, signal))
                .collect())
        }
    }
}

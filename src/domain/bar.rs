//! Bar series representation and input validation.
//!
//! A [`PriceBar`] is what a data source yields: a dated close with an optional
//! pre-computed signal. A [`Bar`] is what the engine consumes: the signal has
//! been resolved, either from the source column or by derivation.

use chrono::NaiveDate;
use std::fmt;

use super::error::SigtraderError;

/// Discrete trading intent carried by each bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Signal {
    /// -1: exit any long position.
    Short,
    /// 0: no action.
    #[default]
    Flat,
    /// 1: open a long position on transition into this state.
    Long,
}

impl Signal {
    pub fn from_value(value: i64, date: NaiveDate) -> Result<Self, SigtraderError> {
        match value {
            -1 => Ok(Signal::Short),
            0 => Ok(Signal::Flat),
            1 => Ok(Signal::Long),
            _ => Err(SigtraderError::InvalidSignal { date, value }),
        }
    }

    pub fn value(self) -> i64 {
        match self {
            Signal::Short => -1,
            Signal::Flat => 0,
            Signal::Long => 1,
        }
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.value())
    }
}

/// A dated close price as loaded from a data source.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceBar {
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Option<Signal>,
}

/// One engine observation: close price plus resolved signal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bar {
    pub date: NaiveDate,
    pub close: f64,
    pub signal: Signal,
}

impl Bar {
    pub fn new(date: NaiveDate, close: f64, signal: Signal) -> Self {
        Bar {
            date,
            close,
            signal,
        }
    }
}

/// Check a single close price.
pub fn validate_price(date: NaiveDate, price: f64) -> Result<(), SigtraderError> {
    if !(price.is_finite() && price > 0.0) {
        return Err(SigtraderError::NonPositivePrice { date, price });
    }
    Ok(())
}

/// Reject series the engine cannot process meaningfully: empty input,
/// non-positive or non-finite closes, and dates that are not strictly increasing.
pub fn validate_series(bars: &[Bar]) -> Result<(), SigtraderError> {
    if bars.is_empty() {
        return Err(SigtraderError::EmptySeries);
    }

    for bar in bars {
        validate_price(bar.date, bar.close)?;
    }

    for w in bars.windows(2) {
        if w[1].date <= w[0].date {
            return Err(SigtraderError::NonMonotonicTimestamp {
                previous: w[0].date,
                current: w[1].date,
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn signal_from_value() {
        assert_eq!(Signal::from_value(-1, date(1)).unwrap(), Signal::Short);
        assert_eq!(Signal::from_value(0, date(1)).unwrap(), Signal::Flat);
        assert_eq!(Signal::from_value(1, date(1)).unwrap(), Signal::Long);
    }

    #[test]
    fn signal_out_of_range() {
        let err = Signal::from_value(2, date(3)).unwrap_err();
        assert!(matches!(err, SigtraderError::InvalidSignal { value: 2, .. }));
    }

    #[test]
    fn signal_round_trips_through_value() {
        for s in [Signal::Short, Signal::Flat, Signal::Long] {
            assert_eq!(Signal::from_value(s.value(), date(1)).unwrap(), s);
        }
        assert_eq!(Signal::default(), Signal::Flat);
        assert_eq!(Signal::Short.to_string(), "-1");
    }

    #[test]
    fn valid_series_passes() {
        let bars = vec![
            Bar::new(date(1), 100.0, Signal::Flat),
            Bar::new(date(2), 101.0, Signal::Long),
        ];
        assert!(validate_series(&bars).is_ok());
    }

    #[test]
    fn empty_series_fails() {
        assert!(matches!(validate_series(&[]), Err(SigtraderError::EmptySeries)));
    }

    #[test]
    fn zero_price_fails() {
        let bars = vec![
            Bar::new(date(1), 100.0, Signal::Flat),
            Bar::new(date(2), 0.0, Signal::Flat),
        ];
        let err = validate_series(&bars).unwrap_err();
        assert!(matches!(err, SigtraderError::NonPositivePrice { date: d, .. } if d == date(2)));
    }

    #[test]
    fn nan_price_fails() {
        let bars = vec![Bar::new(date(1), f64::NAN, Signal::Flat)];
        assert!(matches!(
            validate_series(&bars),
            Err(SigtraderError::NonPositivePrice { .. })
        ));
    }

    #[test]
    fn duplicate_date_fails() {
        let bars = vec![
            Bar::new(date(2), 100.0, Signal::Flat),
            Bar::new(date(2), 101.0, Signal::Flat),
        ];
        let err = validate_series(&bars).unwrap_err();
        assert!(matches!(err, SigtraderError::NonMonotonicTimestamp { .. }));
    }

    #[test]
    fn descending_dates_fail() {
        let bars = vec![
            Bar::new(date(3), 100.0, Signal::Flat),
            Bar::new(date(1), 101.0, Signal::Flat),
        ];
        let err = validate_series(&bars).unwrap_err();
        assert!(matches!(
            err,
            SigtraderError::NonMonotonicTimestamp { previous, current }
                if previous == date(3) && current == date(1)
        ));
    }
}

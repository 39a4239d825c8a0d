//! Domain error types.

use chrono::NaiveDate;

/// Top-level error type for sigtrader.
#[derive(Debug, thiserror::Error)]
pub enum SigtraderError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("data error: {reason}")]
    Data { reason: String },

    #[error("bar series is empty")]
    EmptySeries,

    #[error("non-positive close price {price} on {date}")]
    NonPositivePrice { date: NaiveDate, price: f64 },

    #[error("bars out of order: {current} does not follow {previous}")]
    NonMonotonicTimestamp {
        previous: NaiveDate,
        current: NaiveDate,
    },

    #[error("invalid signal value {value} on {date} (expected -1, 0 or 1)")]
    InvalidSignal { date: NaiveDate, value: i64 },

    #[error("insufficient data for {instrument}: have {bars} bars, need {minimum}")]
    InsufficientData {
        instrument: String,
        bars: usize,
        minimum: usize,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&SigtraderError> for std::process::ExitCode {
    fn from(err: &SigtraderError) -> Self {
        let code: u8 = match err {
            SigtraderError::Io(_) => 1,
            SigtraderError::ConfigParse { .. }
            | SigtraderError::ConfigMissing { .. }
            | SigtraderError::ConfigInvalid { .. } => 2,
            SigtraderError::Data { .. } => 3,
            SigtraderError::EmptySeries
            | SigtraderError::NonPositivePrice { .. }
            | SigtraderError::NonMonotonicTimestamp { .. }
            | SigtraderError::InvalidSignal { .. } => 4,
            SigtraderError::InsufficientData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_context() {
        let err = SigtraderError::NonPositivePrice {
            date: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
            price: -1.5,
        };
        assert_eq!(err.to_string(), "non-positive close price -1.5 on 2024-01-02");

        let err = SigtraderError::ConfigMissing {
            section: "backtest".into(),
            key: "instrument".into(),
        };
        assert_eq!(err.to_string(), "missing config key [backtest] instrument");
    }

    #[test]
    fn exit_codes_by_family() {
        use std::process::ExitCode;

        let cases = [
            (SigtraderError::Io(std::io::Error::other("x")), ExitCode::from(1)),
            (
                SigtraderError::ConfigInvalid {
                    section: "a".into(),
                    key: "b".into(),
                    reason: "c".into(),
                },
                ExitCode::from(2),
            ),
            (SigtraderError::Data { reason: "x".into() }, ExitCode::from(3)),
            (SigtraderError::EmptySeries, ExitCode::from(4)),
            (
                SigtraderError::InsufficientData {
                    instrument: "SPY".into(),
                    bars: 3,
                    minimum: 201,
                },
                ExitCode::from(5),
            ),
        ];
        for (err, expected) in &cases {
            assert_eq!(ExitCode::from(err), *expected);
        }
    }
}

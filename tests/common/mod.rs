#![allow(dead_code)]

use chrono::NaiveDate;
use sigtrader::domain::bar::{Bar, PriceBar, Signal};
use sigtrader::domain::error::SigtraderError;
use sigtrader::ports::data_port::DataPort;
use std::collections::HashMap;
use std::io::Write;

pub struct MockDataPort {
    pub data: HashMap<String, Vec<PriceBar>>,
    pub errors: HashMap<String, String>,
}

impl MockDataPort {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_bars(mut self, instrument: &str, bars: Vec<PriceBar>) -> Self {
        self.data.insert(instrument.to_string(), bars);
        self
    }

    pub fn with_error(mut self, instrument: &str, reason: &str) -> Self {
        self.errors.insert(instrument.to_string(), reason.to_string());
        self
    }
}

impl DataPort for MockDataPort {
    fn fetch_bars(
        &self,
        instrument: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, SigtraderError> {
        if let Some(reason) = self.errors.get(instrument) {
            return Err(SigtraderError::Data {
                reason: reason.clone(),
            });
        }
        Ok(self
            .data
            .get(instrument)
            .map(|bars| {
                bars.iter()
                    .filter(|b| start_date.is_none_or(|s| b.date >= s))
                    .filter(|b| end_date.is_none_or(|e| b.date <= e))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default())
    }
}

pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

/// Consecutive calendar days from 2024-01-01.
pub fn day(offset: usize) -> NaiveDate {
    date(2024, 1, 1) + chrono::Days::new(offset as u64)
}

/// Price bars with signals, one per day.
pub fn price_bars(rows: &[(f64, Signal)]) -> Vec<PriceBar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(close, signal))| PriceBar {
            date: day(i),
            close,
            signal: Some(signal),
        })
        .collect()
}

/// Price bars without signals, for derived-signal runs.
pub fn closes_only(closes: &[f64]) -> Vec<PriceBar> {
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| PriceBar {
            date: day(i),
            close,
            signal: None,
        })
        .collect()
}

pub fn engine_bars(rows: &[(f64, Signal)]) -> Vec<Bar> {
    rows.iter()
        .enumerate()
        .map(|(i, &(close, signal))| Bar::new(day(i), close, signal))
        .collect()
}

pub fn write_temp_file(content: &str, suffix: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new().suffix(suffix).tempfile().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

pub const SAMPLE_CSV: &str = "date,close,signal\n\
2024-01-01,100.0,0\n\
2024-01-02,100.0,1\n\
2024-01-03,105.0,1\n\
2024-01-04,110.0,-1\n\
2024-01-05,108.0,0\n\
2024-01-06,90.0,1\n\
2024-01-07,95.0,-1\n";

//! CSV bar-series adapter.
//!
//! Reads a header row and locates `date`, `close` and the optional `signal`
//! column by name (case-insensitive); any other columns are ignored. The path
//! may be a file, or a directory holding `<instrument>.csv`.

use crate::domain::bar::{PriceBar, Signal};
use crate::domain::error::SigtraderError;
use crate::ports::data_port::DataPort;
use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;

pub struct CsvAdapter {
    path: PathBuf,
}

struct Columns {
    date: usize,
    close: usize,
    signal: Option<usize>,
}

impl CsvAdapter {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    fn csv_path(&self, instrument: &str) -> PathBuf {
        if self.path.is_dir() {
            self.path.join(format!("{}.csv", instrument))
        } else {
            self.path.clone()
        }
    }

    fn locate_columns(headers: &csv::StringRecord) -> Result<Columns, SigtraderError> {
        let find = |name: &str| {
            headers
                .iter()
                .position(|h| h.trim().eq_ignore_ascii_case(name))
        };

        let date = find("date").ok_or_else(|| SigtraderError::Data {
            reason: "missing date column".into(),
        })?;
        let close = find("close").ok_or_else(|| SigtraderError::Data {
            reason: "missing close column".into(),
        })?;

        Ok(Columns {
            date,
            close,
            signal: find("signal"),
        })
    }
}

/// Accepts `YYYY-MM-DD`, with or without a trailing time component.
fn parse_date(value: &str, row: usize) -> Result<NaiveDate, SigtraderError> {
    let value = value.trim();
    let day = value.get(..10).unwrap_or(value);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|e| SigtraderError::Data {
        reason: format!("row {}: invalid date '{}': {}", row, value, e),
    })
}

/// Empty means "no signal". Integral floats such as `1.0` are accepted.
fn parse_signal(
    value: &str,
    date: NaiveDate,
    row: usize,
) -> Result<Option<Signal>, SigtraderError> {
    let value = value.trim();
    if value.is_empty() || value.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    let raw: f64 = value.parse().map_err(|e| SigtraderError::Data {
        reason: format!("row {}: invalid signal '{}': {}", row, value, e),
    })?;
    if raw.fract() != 0.0 {
        return Err(SigtraderError::Data {
            reason: format!("row {}: signal '{}' is not an integer", row, value),
        });
    }
    Signal::from_value(raw as i64, date).map(Some)
}

impl DataPort for CsvAdapter {
    fn fetch_bars(
        &self,
        instrument: &str,
        start_date: Option<NaiveDate>,
        end_date: Option<NaiveDate>,
    ) -> Result<Vec<PriceBar>, SigtraderError> {
        let path = self.csv_path(instrument);
        let content = fs::read_to_string(&path).map_err(|e| SigtraderError::Data {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let headers = rdr.headers().map_err(|e| SigtraderError::Data {
            reason: format!("CSV header error: {}", e),
        })?;
        let columns = Self::locate_columns(headers)?;

        let mut bars = Vec::new();

        for (i, result) in rdr.records().enumerate() {
            // 1-based, counting the header
            let row = i + 2;
            let record = result.map_err(|e| SigtraderError::Data {
                reason: format!("CSV parse error: {}", e),
            })?;

            let date_str = record.get(columns.date).ok_or_else(|| SigtraderError::Data {
                reason: format!("row {}: missing date", row),
            })?;
            let date = parse_date(date_str, row)?;

            if start_date.is_some_and(|s| date < s) || end_date.is_some_and(|e| date > e) {
                continue;
            }

            let close: f64 = record
                .get(columns.close)
                .ok_or_else(|| SigtraderError::Data {
                    reason: format!("row {}: missing close", row),
                })?
                .trim()
                .parse()
                .map_err(|e| SigtraderError::Data {
                    reason: format!("row {}: invalid close value: {}", row, e),
                })?;

            let signal = match columns.signal.and_then(|idx| record.get(idx)) {
                Some(value) => parse_signal(value, date, row)?,
                None => None,
            };

            bars.push(PriceBar {
                date,
                close,
                signal,
            });
        }

        bars.sort_by_key(|b| b.date);
        Ok(bars)
    }
}

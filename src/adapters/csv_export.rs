//! CSV export of the trade ledger and equity curve for external plotting.

use std::path::Path;

use crate::domain::error::SigtraderError;
use crate::domain::portfolio::EquityPoint;
use crate::domain::trade::TradeLedger;

fn csv_error(path: &Path, e: csv::Error) -> SigtraderError {
    SigtraderError::Data {
        reason: format!("failed to write {}: {}", path.display(), e),
    }
}

/// `date,instrument,side,quantity,price,commission`, one row per trade.
pub fn write_trades<P: AsRef<Path>>(ledger: &TradeLedger, path: P) -> Result<(), SigtraderError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;

    wtr.write_record(["date", "instrument", "side", "quantity", "price", "commission"])
        .map_err(|e| csv_error(path, e))?;
    for trade in ledger.trades() {
        wtr.write_record([
            trade.date.to_string(),
            trade.instrument.clone(),
            trade.side().to_string(),
            trade.quantity.to_string(),
            trade.price.to_string(),
            trade.commission.to_string(),
        ])
        .map_err(|e| csv_error(path, e))?;
    }

    wtr.flush()?;
    Ok(())
}

/// `date,value`, one row per bar.
pub fn write_equity<P: AsRef<Path>>(
    equity_curve: &[EquityPoint],
    path: P,
) -> Result<(), SigtraderError> {
    let path = path.as_ref();
    let mut wtr = csv::Writer::from_path(path).map_err(|e| csv_error(path, e))?;

    wtr.write_record(["date", "value"])
        .map_err(|e| csv_error(path, e))?;
    for point in equity_curve {
        wtr.write_record([point.date.to_string(), point.value.to_string()])
            .map_err(|e| csv_error(path, e))?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::trade::TradeRecord;
    use chrono::NaiveDate;
    use std::fs;
    use tempfile::TempDir;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, d).unwrap()
    }

    #[test]
    fn trades_csv_layout() {
        let mut ledger = TradeLedger::new();
        ledger.append(TradeRecord {
            instrument: "SPY".into(),
            quantity: 200.0,
            price: 100.0,
            commission: 20.0,
            date: date(1),
        });
        ledger.append(TradeRecord {
            instrument: "SPY".into(),
            quantity: -200.0,
            price: 110.0,
            commission: 22.0,
            date: date(2),
        });

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        write_trades(&ledger, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = content.lines().collect();
        assert_eq!(lines[0], "date,instrument,side,quantity,price,commission");
        assert_eq!(lines[1], "2024-01-01,SPY,BUY,200,100,20");
        assert_eq!(lines[2], "2024-01-02,SPY,SELL,-200,110,22");
    }

    #[test]
    fn empty_ledger_writes_header_only() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("trades.csv");
        write_trades(&TradeLedger::new(), &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 1);
    }

    #[test]
    fn equity_csv_layout() {
        let curve = vec![
            EquityPoint {
                date: date(1),
                value: 1000.5,
            },
            EquityPoint {
                date: date(2),
                value: 999.0,
            },
        ];
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("equity.csv");
        write_equity(&curve, &path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "date,value\n2024-01-01,1000.5\n2024-01-02,999\n");
    }

    #[test]
    fn unwritable_path_is_data_error() {
        let err = write_equity(&[], "/nonexistent/dir/equity.csv").unwrap_err();
        assert!(matches!(err, SigtraderError::Data { .. }));
    }
}

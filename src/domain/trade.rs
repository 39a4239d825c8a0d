//! Trade records and the append-only trade ledger.

use chrono::NaiveDate;
use std::fmt;

/// Direction of a trade, derived from the sign of its quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Buy,
    Sell,
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Buy => f.write_str("BUY"),
            Side::Sell => f.write_str("SELL"),
        }
    }
}

/// An executed trade. Positive quantity buys, negative quantity sells.
#[derive(Debug, Clone, PartialEq)]
pub struct TradeRecord {
    pub instrument: String,
    pub quantity: f64,
    pub price: f64,
    pub commission: f64,
    pub date: NaiveDate,
}

impl TradeRecord {
    pub fn side(&self) -> Side {
        if self.quantity >= 0.0 {
            Side::Buy
        } else {
            Side::Sell
        }
    }
}

/// Ordered record of every executed trade.
///
/// Only the execution engine appends; readers get slices and positional pairs.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TradeLedger {
    trades: Vec<TradeRecord>,
}

impl TradeLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn append(&mut self, trade: TradeRecord) {
        self.trades.push(trade);
    }

    pub fn trades(&self) -> &[TradeRecord] {
        &self.trades
    }

    pub fn len(&self) -> usize {
        self.trades.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trades.is_empty()
    }

    /// Entries (0,1), (2,3), … as (entry, exit). A trailing odd entry is skipped.
    pub fn pairs(&self) -> impl Iterator<Item = (&TradeRecord, &TradeRecord)> {
        self.trades.chunks_exact(2).map(|c| (&c[0], &c[1]))
    }

    /// The trailing trade left out of positional pairing, if any.
    pub fn unpaired(&self) -> Option<&TradeRecord> {
        self.trades.chunks_exact(2).remainder().first()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trade(quantity: f64, price: f64) -> TradeRecord {
        TradeRecord {
            instrument: "SPY".into(),
            quantity,
            price,
            commission: 1.0,
            date: NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
        }
    }

    #[test]
    fn side_from_quantity_sign() {
        assert_eq!(trade(10.0, 5.0).side(), Side::Buy);
        assert_eq!(trade(-10.0, 5.0).side(), Side::Sell);
        assert_eq!(Side::Sell.to_string(), "SELL");
    }

    #[test]
    fn append_preserves_order() {
        let mut ledger = TradeLedger::new();
        ledger.append(trade(1.0, 10.0));
        ledger.append(trade(-1.0, 11.0));
        ledger.append(trade(2.0, 12.0));

        assert_eq!(ledger.len(), 3);
        let prices: Vec<f64> = ledger.trades().iter().map(|t| t.price).collect();
        assert_eq!(prices, vec![10.0, 11.0, 12.0]);
    }

    #[test]
    fn pairs_are_positional() {
        let mut ledger = TradeLedger::new();
        ledger.append(trade(1.0, 10.0));
        ledger.append(trade(-1.0, 11.0));
        ledger.append(trade(2.0, 12.0));
        ledger.append(trade(-2.0, 13.0));

        let pairs: Vec<(f64, f64)> = ledger.pairs().map(|(a, b)| (a.price, b.price)).collect();
        assert_eq!(pairs, vec![(10.0, 11.0), (12.0, 13.0)]);
        assert!(ledger.unpaired().is_none());
    }

    #[test]
    fn odd_ledger_leaves_last_unpaired() {
        let mut ledger = TradeLedger::new();
        ledger.append(trade(1.0, 10.0));
        ledger.append(trade(-1.0, 11.0));
        ledger.append(trade(3.0, 14.0));

        assert_eq!(ledger.pairs().count(), 1);
        assert_eq!(ledger.unpaired().map(|t| t.price), Some(14.0));
    }

    #[test]
    fn single_trade_has_no_pairs() {
        let mut ledger = TradeLedger::new();
        ledger.append(trade(1.0, 10.0));
        assert_eq!(ledger.pairs().count(), 0);
        assert!(ledger.unpaired().is_some());
    }
}

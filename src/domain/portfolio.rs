//! Portfolio state and equity tracking.
//!
//! Cash and positions are private: the execution engine is the only writer,
//! through [`Portfolio::apply_fill`]. Everything else reads.

use chrono::NaiveDate;
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EquityPoint {
    pub date: NaiveDate,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Portfolio {
    cash: f64,
    initial_cash: f64,
    positions: HashMap<String, f64>,
    equity_curve: Vec<EquityPoint>,
}

impl Portfolio {
    pub fn new(initial_cash: f64) -> Self {
        Portfolio {
            cash: initial_cash,
            initial_cash,
            positions: HashMap::new(),
            equity_curve: Vec::new(),
        }
    }

    pub fn cash(&self) -> f64 {
        self.cash
    }

    pub fn initial_cash(&self) -> f64 {
        self.initial_cash
    }

    pub fn positions(&self) -> &HashMap<String, f64> {
        &self.positions
    }

    /// Held quantity, 0 when the instrument has never been traded.
    pub fn quantity(&self, instrument: &str) -> f64 {
        self.positions.get(instrument).copied().unwrap_or(0.0)
    }

    pub fn equity_curve(&self) -> &[EquityPoint] {
        &self.equity_curve
    }

    /// Apply a fill: `cash -= quantity × price + commission`, `positions += quantity`.
    pub(crate) fn apply_fill(&mut self, instrument: &str, quantity: f64, price: f64, commission: f64) {
        self.cash -= quantity * price + commission;
        *self.positions.entry(instrument.to_string()).or_insert(0.0) += quantity;
    }

    pub(crate) fn record_equity(&mut self, date: NaiveDate, value: f64) {
        self.equity_curve.push(EquityPoint { date, value });
    }

    /// Mark-to-market value with every position priced at `price`.
    ///
    /// Only meaningful for a single-instrument portfolio; see [`Self::value_with`].
    pub fn value(&self, price: f64) -> f64 {
        let position_value: f64 = self.positions.values().map(|&qty| qty * price).sum();
        self.cash + position_value
    }

    /// Mark-to-market value keyed per instrument. Instruments without a price
    /// contribute nothing.
    pub fn value_with(&self, price_map: &HashMap<String, f64>) -> f64 {
        let position_value: f64 = self
            .positions
            .iter()
            .filter_map(|(code, &qty)| price_map.get(code).map(|&price| qty * price))
            .sum();
        self.cash + position_value
    }
}

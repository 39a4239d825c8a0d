//! Signal-driven trade execution.
//!
//! The engine walks bars in date order and maps signal transitions to trades:
//! - entry: signal moves into `Long` from anything else and no long is held;
//!   buys `cash × risk_fraction / close` units at the close. The held check is
//!   an addition to the plain transition rule: `Long → Flat → Long` without an
//!   intervening `Short` does not open a second position.
//! - exit: any bar with signal `Short` while a long is held sells the whole
//!   position at the close. Unlike entry this fires on every `Short` bar, not
//!   only on the transition; the held-quantity guard prevents repeat exits.
//!
//! Sizing uses *current* cash, so after a losing round trip the next entry is
//! smaller than the first. This compounding is intentional.
//!
//! Every cash/position change goes through `BacktestEngine::execute_trade`.

use chrono::NaiveDate;
use tracing::{debug, info, warn};

use super::backtest::BacktestResult;
use super::bar::{validate_price, validate_series, Bar, Signal};
use super::error::SigtraderError;
use super::portfolio::Portfolio;
use super::trade::{TradeLedger, TradeRecord};

pub const DEFAULT_INITIAL_CASH: f64 = 1_000_000.0;
pub const DEFAULT_RISK_FRACTION: f64 = 0.02;
pub const DEFAULT_COMMISSION_RATE: f64 = 0.001;

/// Parameters that drive trade execution.
#[derive(Debug, Clone, PartialEq)]
pub struct ExecutionConfig {
    pub initial_cash: f64,
    /// Fraction of current cash committed to each new long.
    pub risk_fraction: f64,
    /// Commission as a fraction of absolute notional.
    pub commission_rate: f64,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        ExecutionConfig {
            initial_cash: DEFAULT_INITIAL_CASH,
            risk_fraction: DEFAULT_RISK_FRACTION,
            commission_rate: DEFAULT_COMMISSION_RATE,
        }
    }
}

/// Commission: |quantity × price| × rate.
pub fn calculate_commission(quantity: f64, price: f64, commission_rate: f64) -> f64 {
    (quantity * price).abs() * commission_rate
}

/// Units to buy on entry: cash × risk_fraction / price.
pub fn position_size(cash: f64, risk_fraction: f64, price: f64) -> f64 {
    cash * risk_fraction / price
}

/// What a single bar did to the portfolio.
#[derive(Debug, Clone, PartialEq)]
pub enum BarOutcome {
    Entered(TradeRecord),
    Exited(TradeRecord),
    NoTrade,
}

/// One backtest run over one instrument. Not reusable: [`Self::run`] and
/// [`Self::finish`] consume the engine.
#[derive(Debug)]
pub struct BacktestEngine {
    instrument: String,
    config: ExecutionConfig,
    portfolio: Portfolio,
    ledger: TradeLedger,
    previous_signal: Signal,
    last_date: Option<NaiveDate>,
}

impl BacktestEngine {
    pub fn new(instrument: impl Into<String>, config: ExecutionConfig) -> Self {
        let portfolio = Portfolio::new(config.initial_cash);
        BacktestEngine {
            instrument: instrument.into(),
            config,
            portfolio,
            ledger: TradeLedger::new(),
            previous_signal: Signal::Flat,
            last_date: None,
        }
    }

    pub fn instrument(&self) -> &str {
        &self.instrument
    }

    pub fn portfolio(&self) -> &Portfolio {
        &self.portfolio
    }

    pub fn ledger(&self) -> &TradeLedger {
        &self.ledger
    }

    pub fn previous_signal(&self) -> Signal {
        self.previous_signal
    }

    /// Current mark-to-market value at `price`.
    pub fn snapshot(&self, price: f64) -> f64 {
        self.portfolio.value(price)
    }

    /// Validate the whole series, then process it. A validation failure leaves
    /// no partial run behind.
    pub fn run(mut self, bars: &[Bar]) -> Result<BacktestResult, SigtraderError> {
        validate_series(bars)?;

        info!(
            instrument = %self.instrument,
            bars = bars.len(),
            initial_cash = self.config.initial_cash,
            "starting backtest"
        );

        for bar in bars {
            self.execute(bar)?;
        }

        let result = self.finish();
        info!(
            trades = result.ledger.len(),
            final_cash = result.portfolio.cash(),
            "backtest complete"
        );
        Ok(result)
    }

    /// Process one bar. The bar is checked against the previous one before
    /// any state changes, so an error leaves the engine untouched.
    pub fn execute(&mut self, bar: &Bar) -> Result<BarOutcome, SigtraderError> {
        validate_price(bar.date, bar.close)?;
        if let Some(previous) = self.last_date {
            if bar.date <= previous {
                return Err(SigtraderError::NonMonotonicTimestamp {
                    previous,
                    current: bar.date,
                });
            }
        }

        let held = self.portfolio.quantity(&self.instrument);

        let outcome = match bar.signal {
            Signal::Long if self.previous_signal != Signal::Long && held <= 0.0 => {
                let quantity =
                    position_size(self.portfolio.cash(), self.config.risk_fraction, bar.close);
                if quantity > 0.0 {
                    BarOutcome::Entered(self.execute_trade(quantity, bar.close, bar.date))
                } else {
                    BarOutcome::NoTrade
                }
            }
            Signal::Short if held > 0.0 => {
                BarOutcome::Exited(self.execute_trade(-held, bar.close, bar.date))
            }
            _ => BarOutcome::NoTrade,
        };

        self.previous_signal = bar.signal;
        self.last_date = Some(bar.date);
        let value = self.portfolio.value(bar.close);
        self.portfolio.record_equity(bar.date, value);

        Ok(outcome)
    }

    /// The single mutation path for cash, positions and the ledger.
    fn execute_trade(&mut self, quantity: f64, price: f64, date: NaiveDate) -> TradeRecord {
        let commission = calculate_commission(quantity, price, self.config.commission_rate);
        self.portfolio
            .apply_fill(&self.instrument, quantity, price, commission);

        let trade = TradeRecord {
            instrument: self.instrument.clone(),
            quantity,
            price,
            commission,
            date,
        };
        debug!(
            %date,
            side = %trade.side(),
            quantity,
            price,
            commission,
            cash = self.portfolio.cash(),
            "trade executed"
        );
        if self.portfolio.cash() < 0.0 {
            warn!(%date, cash = self.portfolio.cash(), "cash is negative after trade");
        }

        self.ledger.append(trade.clone());
        trade
    }

    pub fn finish(self) -> BacktestResult {
        BacktestResult {
            instrument: self.instrument,
            portfolio: self.portfolio,
            ledger: self.ledger,
        }
    }
}

//! Core domain types and logic.

pub mod bar;
pub mod trade;
pub mod portfolio;
pub mod execution;
pub mod signal;
pub mod backtest;
pub mod metrics;
pub mod config_validation;
pub mod error;

//! Core domain types and the backtest pipeline.

pub mod price;
pub mod returns;
pub mod stats;
pub mod trigger;
pub mod ranking;
pub mod simulator;
pub mod skip;
pub mod metrics;
pub mod backtest;
pub mod universe;
pub mod config_validation;
pub mod error;

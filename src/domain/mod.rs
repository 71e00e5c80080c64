//! Core domain types and logic.

pub mod adjust;
pub mod backtest;
pub mod candle;
pub mod config_validation;
pub mod decision;
pub mod error;
pub mod execution;
pub mod indicator;
pub mod position;
pub mod report;
pub mod signal;
pub mod strategy;

//! confluence — indicator-confluence strategy backtester.
//!
//! Candles flow one way: indicators → signals → a single-position simulator →
//! a summary report. Hexagonal layout: domain logic in [`domain`], port traits
//! in [`ports`], concrete implementations in [`adapters`].

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod ports;

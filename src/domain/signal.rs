//! Signal generation: indicator row + thresholds → Buy / Sell / Hold.
//!
//! Conjunction rules, every sub-condition must hold:
//! - Buy:  close < bb_lower && rsi < rsi_buy  && macd > signal && close > sma
//! - Sell: close > bb_upper && rsi > rsi_sell && macd < signal && close < sma
//!
//! Comparisons against NaN are false, so incomplete rows resolve to Hold.

use serde::{Deserialize, Serialize};

use crate::domain::indicator::{IndicatorFrame, IndicatorRow};
use crate::domain::strategy::StrategyParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

pub fn is_buy(row: &IndicatorRow, params: &StrategyParams) -> bool {
    row.close < row.bb_lower
        && row.rsi < params.rsi_buy
        && row.macd_line > row.macd_signal
        && row.close > row.sma
}

pub fn is_sell(row: &IndicatorRow, params: &StrategyParams) -> bool {
    row.close > row.bb_upper
        && row.rsi > params.rsi_sell
        && row.macd_line < row.macd_signal
        && row.close < row.sma
}

pub fn evaluate_row(row: &IndicatorRow, params: &StrategyParams) -> Signal {
    if is_buy(row, params) {
        Signal::Buy
    } else if is_sell(row, params) {
        Signal::Sell
    } else {
        Signal::Hold
    }
}

/// One signal per frame row. The first row is always Hold.
pub fn generate_signals(frame: &IndicatorFrame<'_>, params: &StrategyParams) -> Vec<Signal> {
    frame
        .rows()
        .enumerate()
        .map(|(i, row)| {
            if i == 0 {
                Signal::Hold
            } else {
                evaluate_row(&row, params)
            }
        })
        .collect()
}

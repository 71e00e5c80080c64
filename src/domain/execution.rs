//! Trade execution costs and fill settlement.
//!
//! Fills happen at the candle close. The only cost is a flat proportional
//! fee charged once per side, each side equal to `fee_rate × capital` at the
//! moment the round trip is settled.

use serde::{Deserialize, Serialize};

use super::position::{Position, Trade};
use chrono::NaiveDateTime;

/// Flat proportional fee model. `fee_rate = 0` is a frictionless account.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct TradingCostModel {
    pub fee_rate: f64,
}

impl TradingCostModel {
    pub fn new(fee_rate: f64) -> Self {
        TradingCostModel { fee_rate }
    }

    pub fn frictionless() -> Self {
        TradingCostModel::default()
    }

    /// Fee for one side of a trade.
    pub fn side_fee(&self, capital: f64) -> f64 {
        capital * self.fee_rate
    }

    /// Entry plus exit fee.
    pub fn round_trip_fee(&self, capital: f64) -> f64 {
        2.0 * self.side_fee(capital)
    }
}

/// Result of closing a position.
#[derive(Debug, Clone, PartialEq)]
pub struct Settlement {
    pub trade: Trade,
    pub capital: f64,
}

/// Close `position` at `exit_price` and apply the result to `capital`.
///
/// profit_amount = capital × return − round-trip fees; the new balance is
/// capital + profit_amount, so consecutive trades compound.
pub fn settle(
    position: &Position,
    exit_price: f64,
    exit_time: NaiveDateTime,
    capital: f64,
    costs: &TradingCostModel,
) -> Settlement {
    let ratio = position.return_ratio(exit_price);
    let profit_amount = capital * ratio - costs.round_trip_fee(capital);

    Settlement {
        trade: Trade {
            entry_time: position.entry_time,
            exit_time,
            entry_price: position.entry_price,
            exit_price,
            profit_pct: ratio * 100.0,
            profit_amount,
        },
        capital: capital + profit_amount,
    }
}

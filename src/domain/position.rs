//! Open position and closed trade records.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// A single open long position.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub entry_price: f64,
    pub entry_time: NaiveDateTime,
}

impl Position {
    /// Price return of closing at `price`, as a ratio (0.05 = +5%).
    pub fn return_ratio(&self, price: f64) -> f64 {
        (price - self.entry_price) / self.entry_price
    }
}

/// One closed round trip. Never mutated after it is recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub entry_time: NaiveDateTime,
    pub exit_time: NaiveDateTime,
    pub entry_price: f64,
    pub exit_price: f64,
    /// Price return in percent, before fees.
    pub profit_pct: f64,
    /// Change in account balance, after fees.
    pub profit_amount: f64,
}

impl Trade {
    pub fn is_win(&self) -> bool {
        self.profit_pct > 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, 15)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn sample_trade(profit_pct: f64) -> Trade {
        Trade {
            entry_time: at(1),
            exit_time: at(5),
            entry_price: 100.0,
            exit_price: 100.0 + profit_pct,
            profit_pct,
            profit_amount: profit_pct * 10.0,
        }
    }

    #[test]
    fn return_ratio_profit() {
        let pos = Position {
            entry_price: 50.0,
            entry_time: at(0),
        };
        assert!((pos.return_ratio(55.0) - 0.1).abs() < 1e-12);
    }

    #[test]
    fn return_ratio_loss() {
        let pos = Position {
            entry_price: 50.0,
            entry_time: at(0),
        };
        assert!((pos.return_ratio(45.0) + 0.1).abs() < 1e-12);
    }

    #[test]
    fn zero_profit_is_not_a_win() {
        assert!(!sample_trade(0.0).is_win());
        assert!(!sample_trade(-1.0).is_win());
        assert!(sample_trade(0.5).is_win());
    }

    #[test]
    fn trade_serializes_iso_times() {
        let json = serde_json::to_value(sample_trade(2.0)).unwrap();
        assert_eq!(json["entry_time"], "2024-01-15T01:00:00");
        assert_eq!(json["exit_time"], "2024-01-15T05:00:00");
    }
}

//! Backtest summary statistics.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::backtest::BacktestConfig;
use super::position::{Position, Trade};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestReport {
    pub symbol: String,
    pub interval: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub initial_balance: f64,
    pub final_balance: f64,
    pub total_return_pct: f64,
    pub num_trades: usize,
    pub winning_trades: usize,
    pub losing_trades: usize,
    pub win_rate: f64,
    pub avg_profit_per_trade: f64,
    pub trades: Vec<Trade>,
    /// Still-open position at the end of the run. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub open_position: Option<Position>,
}

/// Aggregates over a trade log.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TradeStats {
    pub winning: usize,
    pub losing: usize,
    pub win_rate: f64,
    pub avg_profit_pct: f64,
}

impl TradeStats {
    pub fn compute(trades: &[Trade]) -> Self {
        if trades.is_empty() {
            return TradeStats::default();
        }

        let winning = trades.iter().filter(|t| t.is_win()).count();
        let total = trades.len() as f64;
        let sum_pct: f64 = trades.iter().map(|t| t.profit_pct).sum();

        TradeStats {
            winning,
            losing: trades.len() - winning,
            win_rate: winning as f64 / total * 100.0,
            avg_profit_pct: sum_pct / total,
        }
    }
}

pub fn total_return_pct(initial: f64, final_balance: f64) -> f64 {
    if initial == 0.0 {
        0.0
    } else {
        (final_balance - initial) / initial * 100.0
    }
}

impl BacktestReport {
    pub fn build(
        config: &BacktestConfig,
        final_balance: f64,
        trades: Vec<Trade>,
        open_position: Option<Position>,
    ) -> Self {
        let stats = TradeStats::compute(&trades);

        BacktestReport {
            symbol: config.symbol.clone(),
            interval: config.interval.clone(),
            start_date: config.start_date,
            end_date: config.end_date,
            initial_balance: config.initial_balance,
            final_balance,
            total_return_pct: total_return_pct(config.initial_balance, final_balance),
            num_trades: trades.len(),
            winning_trades: stats.winning,
            losing_trades: stats.losing,
            win_rate: stats.win_rate,
            avg_profit_per_trade: stats.avg_profit_pct,
            trades,
            open_position,
        }
    }

    /// Plain-text summary for terminal output.
    pub fn summary(&self) -> String {
        let mut out = format!(
            "{} {} {} → {}\n",
            self.symbol, self.interval, self.start_date, self.end_date
        );
        out.push_str(&format!(
            "  balance: {:.2} → {:.2} ({:+.2}%)\n",
            self.initial_balance, self.final_balance, self.total_return_pct
        ));
        out.push_str(&format!(
            "  trades: {} (won {}, lost {}, win rate {:.1}%, avg {:+.2}%)\n",
            self.num_trades,
            self.winning_trades,
            self.losing_trades,
            self.win_rate,
            self.avg_profit_per_trade
        ));
        if let Some(pos) = &self.open_position {
            out.push_str(&format!(
                "  open: long since {} at {:.4} (not counted)\n",
                pos.entry_time, pos.entry_price
            ));
        }
        out
    }
}

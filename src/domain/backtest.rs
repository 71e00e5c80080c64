//! Backtest engine.
//!
//! BacktestConfig defines the run parameters. The simulator is a single fold
//! over `(candle, signal)` pairs carrying `(position, capital, trades)`:
//!
//! - Flat + Buy  → Long (entry at close)
//! - Long + Sell → Flat (trade realised, capital updated)
//! - anything else leaves the state unchanged
//!
//! A position still open after the last candle is not marked to market and
//! contributes nothing to the trade log or balance.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::adjust::adjust_parameters;
use crate::domain::candle::{closes, Candle};
use crate::domain::execution::{settle, TradingCostModel};
use crate::domain::indicator::IndicatorFrame;
use crate::domain::position::{Position, Trade};
use crate::domain::report::BacktestReport;
use crate::domain::signal::{generate_signals, Signal};
use crate::domain::strategy::StrategyParams;

pub const DEFAULT_INITIAL_BALANCE: f64 = 10_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BacktestConfig {
    pub symbol: String,
    pub interval: String,
    pub start_date: NaiveDateTime,
    pub end_date: NaiveDateTime,
    pub initial_balance: f64,
    pub costs: TradingCostModel,
    /// Run the volatility adjuster over the candles before computing signals.
    pub adjust_parameters: bool,
}

/// Simulator accumulator.
#[derive(Debug, Clone, PartialEq)]
pub struct SimState {
    pub position: Option<Position>,
    pub capital: f64,
    pub trades: Vec<Trade>,
}

impl SimState {
    pub fn new(initial_capital: f64) -> Self {
        SimState {
            position: None,
            capital: initial_capital,
            trades: Vec::new(),
        }
    }

    /// Apply one signal at one candle.
    pub fn step(mut self, candle: &Candle, signal: Signal, costs: &TradingCostModel) -> Self {
        match (signal, self.position.take()) {
            (Signal::Buy, None) => {
                debug!(time = %candle.time, price = candle.close, "opened long");
                self.position = Some(Position {
                    entry_price: candle.close,
                    entry_time: candle.time,
                });
            }
            (Signal::Sell, Some(position)) => {
                let settlement = settle(&position, candle.close, candle.time, self.capital, costs);
                debug!(
                    time = %candle.time,
                    price = candle.close,
                    profit_pct = settlement.trade.profit_pct,
                    capital = settlement.capital,
                    "closed long"
                );
                self.capital = settlement.capital;
                self.trades.push(settlement.trade);
            }
            (_, position) => self.position = position,
        }
        self
    }
}

/// Walk `signals` alongside `candles` in time order, single pass.
///
/// Extra entries on either side are ignored; callers pass aligned slices.
pub fn simulate(
    candles: &[Candle],
    signals: &[Signal],
    initial_capital: f64,
    costs: &TradingCostModel,
) -> SimState {
    candles
        .iter()
        .zip(signals.iter().copied())
        .fold(SimState::new(initial_capital), |state, (candle, signal)| {
            state.step(candle, signal, costs)
        })
}

/// Full pipeline: candles → indicators → signals → trades → report.
pub fn run_backtest(
    candles: &[Candle],
    params: &StrategyParams,
    config: &BacktestConfig,
) -> BacktestReport {
    let mut params = params.clone().sanitized();
    if config.adjust_parameters {
        params = adjust_parameters(&closes(candles), &params);
    }

    if candles.len() < params.lookback() {
        debug!(
            bars = candles.len(),
            lookback = params.lookback(),
            "history shorter than indicator lookback"
        );
    }

    let frame = IndicatorFrame::compute(candles, &params);
    let signals = generate_signals(&frame, &params);
    let state = simulate(candles, &signals, config.initial_balance, &config.costs);

    let report = BacktestReport::build(config, state.capital, state.trades, state.position);

    info!(
        symbol = %config.symbol,
        interval = %config.interval,
        bars = candles.len(),
        trades = report.num_trades,
        total_return_pct = report.total_return_pct,
        "backtest finished"
    );

    report
}

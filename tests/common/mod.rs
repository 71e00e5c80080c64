#![allow(dead_code)]

use chrono::{Duration, NaiveDate, NaiveDateTime};
use confluence::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_BALANCE};
use confluence::domain::candle::Candle;
use confluence::domain::error::ConfluenceError;
use confluence::domain::execution::TradingCostModel;
use confluence::domain::strategy::StrategyParams;
use confluence::ports::data_port::CandleSource;
use std::collections::HashMap;

/// In-memory candle source keyed by `SYMBOL_interval`.
pub struct MockCandleSource {
    pub data: HashMap<String, Vec<Candle>>,
    pub errors: HashMap<String, String>,
}

impl MockCandleSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_candles(mut self, symbol: &str, interval: &str, candles: Vec<Candle>) -> Self {
        self.data.insert(key(symbol, interval), candles);
        self
    }

    pub fn with_error(mut self, symbol: &str, interval: &str, reason: &str) -> Self {
        self.errors.insert(key(symbol, interval), reason.to_string());
        self
    }

    fn lookup(&self, symbol: &str, interval: &str) -> Result<Vec<Candle>, ConfluenceError> {
        let k = key(symbol, interval);
        if let Some(reason) = self.errors.get(&k) {
            return Err(ConfluenceError::DataSource {
                reason: reason.clone(),
            });
        }
        Ok(self.data.get(&k).cloned().unwrap_or_default())
    }
}

fn key(symbol: &str, interval: &str) -> String {
    format!("{symbol}_{interval}")
}

impl CandleSource for MockCandleSource {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        Ok(self
            .lookup(symbol, interval)?
            .into_iter()
            .filter(|c| c.time >= start && c.time <= end)
            .collect())
    }

    fn recent_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        let candles = self.lookup(symbol, interval)?;
        let skip = candles.len().saturating_sub(limit);
        Ok(candles.into_iter().skip(skip).collect())
    }
}

pub fn datetime(y: i32, m: u32, d: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(y, m, d)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap()
}

/// Hourly flat candles (open = high = low = close) starting 2024-01-01.
pub fn candles_from_closes(closes: &[f64]) -> Vec<Candle> {
    let start = datetime(2024, 1, 1);
    closes
        .iter()
        .enumerate()
        .map(|(i, &close)| Candle {
            time: start + Duration::hours(i as i64),
            open: close,
            high: close,
            low: close,
            close,
            volume: 1_000.0,
        })
        .collect()
}

pub fn sample_config(costs: TradingCostModel) -> BacktestConfig {
    BacktestConfig {
        symbol: "BTCUSDT".into(),
        interval: "1h".into(),
        start_date: datetime(2024, 1, 1),
        end_date: datetime(2024, 2, 1),
        initial_balance: DEFAULT_INITIAL_BALANCE,
        costs,
        adjust_parameters: false,
    }
}

/// Down-then-up series with short lookbacks; produces no signal.
pub const GOLDEN_HOLD_CLOSES: [f64; 11] = [
    100.0, 95.0, 90.0, 85.0, 90.0, 95.0, 100.0, 105.0, 110.0, 105.0, 100.0,
];

pub fn golden_hold_params() -> StrategyParams {
    StrategyParams {
        bb_length: 3,
        rsi_length: 3,
        rsi_buy: 40.0,
        rsi_sell: 60.0,
        ..StrategyParams::default()
    }
}

/// Rally, pullback, second leg, slow bleed: exactly one round trip
/// (buy at index 13, sell at index 30) under `golden_trade_params`.
pub const GOLDEN_TRADE_CLOSES: [f64; 34] = [
    100.0, 108.0, 116.64, 125.97, 136.05, 146.93, 158.69, 171.38, 185.09, 199.9, 215.89, 233.16,
    251.82, 236.71, 255.64, 276.1, 298.18, 322.04, 315.6, 309.29, 303.1, 297.04, 291.1, 285.28,
    279.57, 273.98, 268.5, 263.13, 257.87, 252.71, 257.76, 252.61, 247.56, 242.6,
];

pub fn golden_trade_params() -> StrategyParams {
    StrategyParams {
        bb_length: 3,
        bb_std: 0.1,
        rsi_length: 3,
        rsi_buy: 90.0,
        rsi_sell: 10.0,
        macd_fast: 3,
        macd_slow: 6,
        macd_signal: 9,
        sma_length: 5,
    }
}

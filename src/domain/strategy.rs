//! Strategy thresholds and indicator parameters.

use serde::{Deserialize, Serialize};

use crate::domain::indicator::IndicatorType;

pub const DEFAULT_BB_LENGTH: usize = 20;
pub const DEFAULT_BB_STD: f64 = 2.0;
pub const DEFAULT_RSI_LENGTH: usize = 14;
pub const DEFAULT_RSI_BUY: f64 = 30.0;
pub const DEFAULT_RSI_SELL: f64 = 70.0;
pub const DEFAULT_MACD_FAST: usize = 12;
pub const DEFAULT_MACD_SLOW: usize = 26;
pub const DEFAULT_MACD_SIGNAL: usize = 9;
pub const DEFAULT_SMA_LENGTH: usize = 50;

/// Threshold configuration for the confluence strategy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StrategyParams {
    pub bb_length: usize,
    pub bb_std: f64,
    pub rsi_length: usize,
    pub rsi_buy: f64,
    pub rsi_sell: f64,
    pub macd_fast: usize,
    pub macd_slow: usize,
    pub macd_signal: usize,
    pub sma_length: usize,
}

impl Default for StrategyParams {
    fn default() -> Self {
        StrategyParams {
            bb_length: DEFAULT_BB_LENGTH,
            bb_std: DEFAULT_BB_STD,
            rsi_length: DEFAULT_RSI_LENGTH,
            rsi_buy: DEFAULT_RSI_BUY,
            rsi_sell: DEFAULT_RSI_SELL,
            macd_fast: DEFAULT_MACD_FAST,
            macd_slow: DEFAULT_MACD_SLOW,
            macd_signal: DEFAULT_MACD_SIGNAL,
            sma_length: DEFAULT_SMA_LENGTH,
        }
    }
}

impl StrategyParams {
    /// Replace every unusable field with its default.
    ///
    /// Zero periods, a Bollinger length below 2 (sample deviation needs two
    /// points), non-finite or negative band multipliers and RSI thresholds
    /// outside [0, 100] are all unusable.
    pub fn sanitized(self) -> Self {
        fn period(value: usize, min: usize, default: usize) -> usize {
            if value < min { default } else { value }
        }
        fn rsi_level(value: f64, default: f64) -> f64 {
            if value.is_finite() && (0.0..=100.0).contains(&value) {
                value
            } else {
                default
            }
        }

        StrategyParams {
            bb_length: period(self.bb_length, 2, DEFAULT_BB_LENGTH),
            bb_std: if self.bb_std.is_finite() && self.bb_std >= 0.0 {
                self.bb_std
            } else {
                DEFAULT_BB_STD
            },
            rsi_length: period(self.rsi_length, 1, DEFAULT_RSI_LENGTH),
            rsi_buy: rsi_level(self.rsi_buy, DEFAULT_RSI_BUY),
            rsi_sell: rsi_level(self.rsi_sell, DEFAULT_RSI_SELL),
            macd_fast: period(self.macd_fast, 1, DEFAULT_MACD_FAST),
            macd_slow: period(self.macd_slow, 1, DEFAULT_MACD_SLOW),
            macd_signal: period(self.macd_signal, 1, DEFAULT_MACD_SIGNAL),
            sma_length: period(self.sma_length, 1, DEFAULT_SMA_LENGTH),
        }
    }

    pub fn indicators(&self) -> Vec<IndicatorType> {
        vec![
            IndicatorType::Bollinger {
                period: self.bb_length,
                stddev_mult_x100: (self.bb_std * 100.0).round() as u32,
            },
            IndicatorType::Rsi(self.rsi_length),
            IndicatorType::Macd {
                fast: self.macd_fast,
                slow: self.macd_slow,
                signal: self.macd_signal,
            },
            IndicatorType::Sma(self.sma_length),
        ]
    }

    /// Rows needed before every indicator the rules read is defined.
    pub fn lookback(&self) -> usize {
        self.indicators()
            .iter()
            .map(IndicatorType::warmup)
            .max()
            .unwrap_or(0)
            + 1
    }
}

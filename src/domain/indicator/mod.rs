//! Technical indicator implementations.
//!
//! Every indicator is a pure function over a close-price slice returning
//! series aligned index-for-index with the input. Undefined entries (warmup,
//! degenerate windows) are `f64::NAN`; NaN compares false, so downstream
//! signal rules treat them as non-actionable without special casing.
//!
//! - `IndicatorType`: indicator identity + parameters, used for display and warmup
//! - `IndicatorFrame`: candles plus every series the confluence strategy reads
//! - `IndicatorRow`: one index of a frame

pub mod bollinger;
pub mod ema;
pub mod macd;
pub mod rsi;
pub mod sma;
pub mod stddev;

pub use bollinger::calculate_bollinger;
pub use ema::calculate_ema;
pub use macd::calculate_macd;
pub use rsi::calculate_rsi;
pub use sma::calculate_sma;
pub use stddev::calculate_stddev;

use chrono::NaiveDateTime;
use std::fmt;

use crate::domain::candle::{closes, Candle};
use crate::domain::strategy::StrategyParams;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum IndicatorType {
    Sma(usize),
    Rsi(usize),
    Macd {
        fast: usize,
        slow: usize,
        signal: usize,
    },
    Bollinger {
        period: usize,
        stddev_mult_x100: u32,
    },
}

impl IndicatorType {
    /// Number of leading values that are undefined for a well-formed input.
    pub fn warmup(&self) -> usize {
        match self {
            IndicatorType::Sma(period)
            | IndicatorType::Rsi(period)
            | IndicatorType::Bollinger { period, .. } => period.saturating_sub(1),
            IndicatorType::Macd { .. } => 0,
        }
    }
}

impl fmt::Display for IndicatorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndicatorType::Sma(period) => write!(f, "SMA({})", period),
            IndicatorType::Rsi(period) => write!(f, "RSI({})", period),
            IndicatorType::Macd { fast, slow, signal } => {
                write!(f, "MACD({},{},{})", fast, slow, signal)
            }
            IndicatorType::Bollinger {
                period,
                stddev_mult_x100,
            } => {
                let mult = *stddev_mult_x100 as f64 / 100.0;
                write!(f, "BOLLINGER({},{})", period, mult)
            }
        }
    }
}

/// One row of an [`IndicatorFrame`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorRow {
    pub time: NaiveDateTime,
    pub close: f64,
    pub sma: f64,
    pub rsi: f64,
    pub bb_upper: f64,
    pub bb_middle: f64,
    pub bb_lower: f64,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
}

impl IndicatorRow {
    /// True when every value the signal rules read is defined.
    pub fn is_complete(&self) -> bool {
        [
            self.close,
            self.sma,
            self.rsi,
            self.bb_upper,
            self.bb_lower,
            self.macd_line,
            self.macd_signal,
        ]
        .iter()
        .all(|v| !v.is_nan())
    }
}

/// Candles augmented with every series the strategy needs.
///
/// Built once per run and never mutated afterwards.
#[derive(Debug, Clone)]
pub struct IndicatorFrame<'a> {
    pub candles: &'a [Candle],
    pub sma: Vec<f64>,
    pub rsi: Vec<f64>,
    pub bb_upper: Vec<f64>,
    pub bb_middle: Vec<f64>,
    pub bb_lower: Vec<f64>,
    pub macd_line: Vec<f64>,
    pub macd_signal: Vec<f64>,
    pub macd_histogram: Vec<f64>,
}

impl<'a> IndicatorFrame<'a> {
    pub fn compute(candles: &'a [Candle], params: &StrategyParams) -> Self {
        let close = closes(candles);

        let bands = calculate_bollinger(&close, params.bb_length, params.bb_std);
        let macd = calculate_macd(
            &close,
            params.macd_fast,
            params.macd_slow,
            params.macd_signal,
        );

        IndicatorFrame {
            candles,
            sma: calculate_sma(&close, params.sma_length),
            rsi: calculate_rsi(&close, params.rsi_length),
            bb_upper: bands.upper,
            bb_middle: bands.middle,
            bb_lower: bands.lower,
            macd_line: macd.line,
            macd_signal: macd.signal,
            macd_histogram: macd.histogram,
        }
    }

    pub fn len(&self) -> usize {
        self.candles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candles.is_empty()
    }

    pub fn row(&self, i: usize) -> IndicatorRow {
        IndicatorRow {
            time: self.candles[i].time,
            close: self.candles[i].close,
            sma: self.sma[i],
            rsi: self.rsi[i],
            bb_upper: self.bb_upper[i],
            bb_middle: self.bb_middle[i],
            bb_lower: self.bb_lower[i],
            macd_line: self.macd_line[i],
            macd_signal: self.macd_signal[i],
            macd_histogram: self.macd_histogram[i],
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = IndicatorRow> + '_ {
        (0..self.len()).map(|i| self.row(i))
    }

    pub fn last_row(&self) -> Option<IndicatorRow> {
        self.len().checked_sub(1).map(|i| self.row(i))
    }
}

//! Bollinger Bands indicator.
//!
//! Bollinger Bands consist of:
//! - Middle: Simple Moving Average (SMA) over n periods
//! - Upper: Middle + (multiplier × StdDev)
//! - Lower: Middle - (multiplier × StdDev)
//!
//! Where StdDev is the rolling sample standard deviation (divides by N-1).
//!
//! Default parameters: period=20, multiplier=2.0
//! Warmup: first (period-1) values are NaN.

use super::sma::calculate_sma;
use super::stddev::calculate_stddev;

#[derive(Debug, Clone, PartialEq)]
pub struct BollingerBands {
    pub upper: Vec<f64>,
    pub middle: Vec<f64>,
    pub lower: Vec<f64>,
}

pub fn calculate_bollinger(values: &[f64], period: usize, multiplier: f64) -> BollingerBands {
    let middle = calculate_sma(values, period);
    let stddev = calculate_stddev(values, period);

    let (upper, lower) = middle
        .iter()
        .zip(&stddev)
        .map(|(&m, &sd)| {
            let width = multiplier * sd;
            (m + width, m - width)
        })
        .unzip();

    BollingerBands {
        upper,
        middle,
        lower,
    }
}

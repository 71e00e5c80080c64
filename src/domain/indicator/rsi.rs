//! RSI (Relative Strength Index) indicator.
//!
//! Uses simple trailing means of gains/losses over n price changes:
//! - change[0] counts as no movement (0), change[i] = P[i] - P[i-1]
//! - avg_gain / avg_loss = SMA(n) of positive / negated negative changes
//!
//! Formula: RSI = 100 - (100 / (1 + avg_gain / avg_loss))
//! If avg_loss == 0 and avg_gain > 0: RSI = 100.
//! If both are 0 the ratio is 0/0 and RSI is NaN, not 50.
//!
//! Warmup: first (n-1) values are NaN.

use super::sma::calculate_sma;

pub fn calculate_rsi(values: &[f64], period: usize) -> Vec<f64> {
    let changes: Vec<f64> = (0..values.len())
        .map(|i| if i == 0 { 0.0 } else { values[i] - values[i - 1] })
        .collect();

    let gains: Vec<f64> = changes
        .iter()
        .map(|&c| if c.is_nan() || c > 0.0 { c } else { 0.0 })
        .collect();
    let losses: Vec<f64> = changes
        .iter()
        .map(|&c| if c.is_nan() || c < 0.0 { -c } else { 0.0 })
        .collect();

    let avg_gain = calculate_sma(&gains, period);
    let avg_loss = calculate_sma(&losses, period);

    avg_gain
        .iter()
        .zip(&avg_loss)
        .map(|(&gain, &loss)| rsi_from_averages(gain, loss))
        .collect()
}

fn rsi_from_averages(avg_gain: f64, avg_loss: f64) -> f64 {
    if avg_gain.is_nan() || avg_loss.is_nan() {
        return f64::NAN;
    }
    if avg_loss == 0.0 {
        return if avg_gain > 0.0 { 100.0 } else { f64::NAN };
    }
    100.0 - (100.0 / (1.0 + avg_gain / avg_loss))
}

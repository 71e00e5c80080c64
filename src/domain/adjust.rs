//! Volatility-conditioned RSI band widening.
//!
//! One-shot and deterministic: no search, no state. When the dispersion of
//! close-to-close changes exceeds their mean plus one deviation, the RSI entry
//! and exit thresholds move 5 points outward, clamped to 20 and 80.

use tracing::debug;

use super::strategy::StrategyParams;

const RSI_STEP: f64 = 5.0;
const RSI_BUY_FLOOR: f64 = 20.0;
const RSI_SELL_CEILING: f64 = 80.0;

/// Population mean and standard deviation. `None` for an empty slice.
fn mean_and_std(values: &[f64]) -> Option<(f64, f64)> {
    if values.is_empty() {
        return None;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    Some((mean, variance.sqrt()))
}

pub fn adjust_parameters(closes: &[f64], params: &StrategyParams) -> StrategyParams {
    let diffs: Vec<f64> = closes.windows(2).map(|w| w[1] - w[0]).collect();
    let Some((mean, std)) = mean_and_std(&diffs) else {
        return params.clone();
    };

    let volatility = std;
    if volatility > mean + std {
        let adjusted = StrategyParams {
            rsi_buy: (params.rsi_buy - RSI_STEP).max(RSI_BUY_FLOOR),
            rsi_sell: (params.rsi_sell + RSI_STEP).min(RSI_SELL_CEILING),
            ..params.clone()
        };
        debug!(
            volatility,
            mean,
            rsi_buy = adjusted.rsi_buy,
            rsi_sell = adjusted.rsi_sell,
            "widened RSI thresholds"
        );
        adjusted
    } else {
        params.clone()
    }
}

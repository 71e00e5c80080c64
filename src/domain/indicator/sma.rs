//! Simple Moving Average.
//!
//! SMA(n)[i] = mean(P[i-n+1..=i])
//! Warmup: first (n-1) values are NaN. A NaN inside the window yields NaN.

pub fn calculate_sma(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![f64::NAN; values.len()];
    }

    let warmup = period - 1;

    (0..values.len())
        .map(|i| {
            if i < warmup {
                return f64::NAN;
            }
            let window = &values[i + 1 - period..=i];
            window.iter().sum::<f64>() / period as f64
        })
        .collect()
}

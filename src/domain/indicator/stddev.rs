//! Rolling Standard Deviation.
//!
//! Sample standard deviation over n values (divides by n-1).
//! STDDEV(n)[i] = sqrt(sum((P[i-j] - SMA(n)[i])^2 for j in 0..n) / (n-1))
//! Warmup: first (n-1) values are NaN. n < 2 is undefined everywhere.

pub fn calculate_stddev(values: &[f64], period: usize) -> Vec<f64> {
    if period < 2 {
        return vec![f64::NAN; values.len()];
    }

    let warmup = period - 1;

    (0..values.len())
        .map(|i| {
            if i < warmup {
                return f64::NAN;
            }
            let window = &values[i + 1 - period..=i];
            let mean: f64 = window.iter().sum::<f64>() / period as f64;
            let variance: f64 = window
                .iter()
                .map(|v| {
                    let diff = v - mean;
                    diff * diff
                })
                .sum::<f64>()
                / (period - 1) as f64;
            variance.sqrt()
        })
        .collect()
}

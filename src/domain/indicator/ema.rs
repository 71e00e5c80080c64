//! Exponential Moving Average.
//!
//! k = 2/(n+1), seeded with the first defined value (no bias adjustment),
//! then EMA[i] = P[i]*k + EMA[i-1]*(1-k).
//! The recursion runs over the full history, so every value depends on all
//! earlier ones. Leading NaNs stay NaN until the seed.

pub fn calculate_ema(values: &[f64], span: usize) -> Vec<f64> {
    if span == 0 {
        return vec![f64::NAN; values.len()];
    }

    let k = 2.0 / (span as f64 + 1.0);
    let mut ema: Option<f64> = None;

    values
        .iter()
        .map(|&v| {
            let next = match ema {
                None if v.is_nan() => return f64::NAN,
                None => v,
                Some(prev) => v * k + prev * (1.0 - k),
            };
            ema = Some(next);
            next
        })
        .collect()
}

//! Historical candle source port trait.

use crate::domain::candle::Candle;
use crate::domain::error::ConfluenceError;
use chrono::NaiveDateTime;

/// Supplies time-ordered candles. An empty result is a valid "no data"
/// outcome; transport or parse failures surface as one error, no retry.
pub trait CandleSource: Send + Sync {
    /// Candles with `start <= time <= end`, sorted by time.
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Candle>, ConfluenceError>;

    /// The newest `limit` candles, sorted by time.
    fn recent_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ConfluenceError>;
}

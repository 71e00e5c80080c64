//! CSV file candle source.
//!
//! One file per market: `<dir>/<SYMBOL>_<interval>.csv` with header
//! `time,open,high,low,close,volume`. `time` is either Unix epoch
//! milliseconds or a date/time string accepted by [`parse_timestamp`].

use crate::domain::candle::{from_epoch_millis, parse_timestamp, Candle};
use crate::domain::error::ConfluenceError;
use crate::ports::data_port::CandleSource;
use chrono::NaiveDateTime;
use std::fs;
use std::path::PathBuf;
use tracing::debug;

pub struct CsvCandleSource {
    base_path: PathBuf,
}

impl CsvCandleSource {
    pub fn new(base_path: PathBuf) -> Self {
        Self { base_path }
    }

    fn csv_path(&self, symbol: &str, interval: &str) -> PathBuf {
        self.base_path.join(format!("{}_{}.csv", symbol, interval))
    }

    /// Every candle in the file, sorted by time.
    fn load(&self, symbol: &str, interval: &str) -> Result<Vec<Candle>, ConfluenceError> {
        let path = self.csv_path(symbol, interval);
        let content = fs::read_to_string(&path).map_err(|e| ConfluenceError::DataSource {
            reason: format!("failed to read {}: {}", path.display(), e),
        })?;

        let mut rdr = csv::Reader::from_reader(content.as_bytes());
        let mut candles = Vec::new();

        for result in rdr.records() {
            let record = result.map_err(|e| ConfluenceError::DataSource {
                reason: format!("CSV parse error: {}", e),
            })?;

            let time_str = field(&record, 0, "time")?;
            let time = parse_time(time_str)?;

            candles.push(Candle {
                time,
                open: price(&record, 1, "open")?,
                high: price(&record, 2, "high")?,
                low: price(&record, 3, "low")?,
                close: price(&record, 4, "close")?,
                volume: price(&record, 5, "volume")?,
            });
        }

        candles.sort_by_key(|c| c.time);
        debug!(path = %path.display(), rows = candles.len(), "loaded candles");
        Ok(candles)
    }
}

fn field<'r>(
    record: &'r csv::StringRecord,
    idx: usize,
    name: &str,
) -> Result<&'r str, ConfluenceError> {
    record
        .get(idx)
        .map(str::trim)
        .ok_or_else(|| ConfluenceError::DataSource {
            reason: format!("missing {} column", name),
        })
}

fn price(record: &csv::StringRecord, idx: usize, name: &str) -> Result<f64, ConfluenceError> {
    field(record, idx, name)?
        .parse()
        .map_err(|e| ConfluenceError::DataSource {
            reason: format!("invalid {} value: {}", name, e),
        })
}

fn parse_time(value: &str) -> Result<NaiveDateTime, ConfluenceError> {
    if let Ok(millis) = value.parse::<i64>() {
        return from_epoch_millis(millis).ok_or_else(|| ConfluenceError::DataSource {
            reason: format!("epoch milliseconds out of range: {}", millis),
        });
    }
    parse_timestamp(value).map_err(|_| ConfluenceError::DataSource {
        reason: format!("invalid time value: {}", value),
    })
}

impl CandleSource for CsvCandleSource {
    fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        start: NaiveDateTime,
        end: NaiveDateTime,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        let mut candles = self.load(symbol, interval)?;
        candles.retain(|c| c.time >= start && c.time <= end);
        Ok(candles)
    }

    fn recent_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: usize,
    ) -> Result<Vec<Candle>, ConfluenceError> {
        let candles = self.load(symbol, interval)?;
        let skip = candles.len().saturating_sub(limit);
        Ok(candles.into_iter().skip(skip).collect())
    }
}

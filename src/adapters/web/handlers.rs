//! HTTP request handlers for the web adapter.

use axum::{
    Json,
    extract::{Query, State, rejection::JsonRejection},
};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::domain::backtest::{run_backtest as run_backtest_engine, BacktestConfig};
use crate::domain::candle::{parse_timestamp, Candle};
use crate::domain::report::BacktestReport;
use crate::domain::strategy::{self, StrategyParams};

use super::{AppState, WebError};

pub const DEFAULT_SYMBOL: &str = "BTCUSDT";
pub const DEFAULT_INTERVAL: &str = "1m";
pub const HISTORY_LIMIT: usize = 1000;

#[derive(Debug, Deserialize)]
pub struct HistoricalQuery {
    pub symbol: Option<String>,
    pub interval: Option<String>,
}

/// Chart-friendly candle: epoch-millisecond time, no volume.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandlePoint {
    pub time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
}

impl From<&Candle> for CandlePoint {
    fn from(c: &Candle) -> Self {
        CandlePoint {
            time: c.epoch_millis(),
            open: c.open,
            high: c.high,
            low: c.low,
            close: c.close,
        }
    }
}

/// Body of `POST /api/backtest`.
///
/// Only the dates are strict. Strategy fields accept numbers or numeric
/// strings; anything else reads as absent and takes the default.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BacktestRequest {
    pub symbol: Option<String>,
    pub interval: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_period")]
    pub bb_length: Option<usize>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub bb_std: Option<f64>,
    #[serde(default, deserialize_with = "lenient_period")]
    pub rsi_length: Option<usize>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub rsi_buy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_level")]
    pub rsi_sell: Option<f64>,
    #[serde(default, deserialize_with = "lenient_period")]
    pub macd_fast: Option<usize>,
    #[serde(default, deserialize_with = "lenient_period")]
    pub macd_slow: Option<usize>,
    #[serde(default, deserialize_with = "lenient_period")]
    pub macd_signal: Option<usize>,
    #[serde(default, deserialize_with = "lenient_period")]
    pub sma_length: Option<usize>,
}

impl BacktestRequest {
    pub fn strategy_params(&self) -> StrategyParams {
        StrategyParams {
            bb_length: self.bb_length.unwrap_or(strategy::DEFAULT_BB_LENGTH),
            bb_std: self.bb_std.unwrap_or(strategy::DEFAULT_BB_STD),
            rsi_length: self.rsi_length.unwrap_or(strategy::DEFAULT_RSI_LENGTH),
            rsi_buy: self.rsi_buy.unwrap_or(strategy::DEFAULT_RSI_BUY),
            rsi_sell: self.rsi_sell.unwrap_or(strategy::DEFAULT_RSI_SELL),
            macd_fast: self.macd_fast.unwrap_or(strategy::DEFAULT_MACD_FAST),
            macd_slow: self.macd_slow.unwrap_or(strategy::DEFAULT_MACD_SLOW),
            macd_signal: self.macd_signal.unwrap_or(strategy::DEFAULT_MACD_SIGNAL),
            sma_length: self.sma_length.unwrap_or(strategy::DEFAULT_SMA_LENGTH),
        }
        .sanitized()
    }

    pub fn backtest_config(&self, state: &AppState) -> Result<BacktestConfig, WebError> {
        let start_date = parse_timestamp(required(&self.start_date, "startDate")?)?;
        let end_date = parse_timestamp(required(&self.end_date, "endDate")?)?;
        if start_date >= end_date {
            return Err(WebError::bad_request("startDate must be before endDate"));
        }

        Ok(BacktestConfig {
            symbol: non_empty(&self.symbol).unwrap_or(DEFAULT_SYMBOL).to_string(),
            interval: non_empty(&self.interval).unwrap_or(DEFAULT_INTERVAL).to_string(),
            start_date,
            end_date,
            initial_balance: state.initial_balance,
            costs: state.costs,
            adjust_parameters: state.adjust_parameters,
        })
    }
}

fn number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|v| v.is_finite())
}

fn lenient_level<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(number))
}

fn lenient_period<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<usize>, D::Error> {
    Ok(Option::<Value>::deserialize(deserializer)?
        .as_ref()
        .and_then(number)
        .filter(|v| *v >= 0.0 && v.fract() == 0.0 && *v <= u32::MAX as f64)
        .map(|v| v as usize))
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|s| !s.is_empty())
}

fn required<'a>(value: &'a Option<String>, field: &str) -> Result<&'a str, WebError> {
    non_empty(value).ok_or_else(|| WebError::bad_request(format!("missing field {field}")))
}

pub async fn historical_data(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoricalQuery>,
) -> Result<Json<Vec<CandlePoint>>, WebError> {
    let symbol = non_empty(&query.symbol).unwrap_or(DEFAULT_SYMBOL).to_string();
    let interval = non_empty(&query.interval).unwrap_or(DEFAULT_INTERVAL).to_string();

    let candles = tokio::task::spawn_blocking(move || {
        state.source.recent_candles(&symbol, &interval, HISTORY_LIMIT)
    })
    .await
    .map_err(|e| WebError::internal(format!("Task join error: {e}")))??;

    Ok(Json(candles.iter().map(CandlePoint::from).collect()))
}

pub async fn run_backtest(
    State(state): State<Arc<AppState>>,
    body: Result<Json<BacktestRequest>, JsonRejection>,
) -> Result<Json<BacktestReport>, WebError> {
    let Json(request) = body.map_err(|e| WebError::bad_request(e.body_text()))?;
    let config = request.backtest_config(&state)?;
    let params = request.strategy_params();

    let report = tokio::task::spawn_blocking(move || {
        let candles = state.source.fetch_candles(
            &config.symbol,
            &config.interval,
            config.start_date,
            config.end_date,
        )?;
        Ok::<_, crate::domain::error::ConfluenceError>(run_backtest_engine(
            &candles, &params, &config,
        ))
    })
    .await
    .map_err(|e| WebError::internal(format!("Task join error: {e}")))??;

    Ok(Json(report))
}

pub async fn not_found() -> WebError {
    WebError::not_found("Page not found")
}

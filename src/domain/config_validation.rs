//! Configuration validation and loading.
//!
//! `[backtest]` is validated strictly before a run; `[strategy]` is lenient and
//! falls back to defaults key by key.

use crate::domain::backtest::{BacktestConfig, DEFAULT_INITIAL_BALANCE};
use crate::domain::candle::parse_timestamp;
use crate::domain::error::ConfluenceError;
use crate::domain::execution::TradingCostModel;
use crate::domain::strategy::{self, StrategyParams};
use crate::ports::config_port::ConfigPort;
use chrono::NaiveDateTime;

pub const DEFAULT_DATA_DIR: &str = "data";

/// The `[backtest]` settings shared by every run a server handles.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountConfig {
    pub initial_balance: f64,
    pub costs: TradingCostModel,
    pub adjust_parameters: bool,
}

pub fn validate_backtest_config(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    validate_initial_balance(config)?;
    validate_fee_rate(config)?;
    validate_dates(config)?;
    validate_required(config, "symbol")?;
    validate_required(config, "interval")?;
    Ok(())
}

/// Validate `[backtest]` and build the run configuration from it.
pub fn backtest_config_from_config(
    config: &dyn ConfigPort,
) -> Result<BacktestConfig, ConfluenceError> {
    validate_backtest_config(config)?;
    let (start_date, end_date) = parse_dates(config)?;
    let account = account_config_from_config(config)?;

    Ok(BacktestConfig {
        symbol: required_string(config, "symbol")?,
        interval: required_string(config, "interval")?,
        start_date,
        end_date,
        initial_balance: account.initial_balance,
        costs: account.costs,
        adjust_parameters: account.adjust_parameters,
    })
}

/// Balance, fees and the adjust flag, validated without requiring a date range.
pub fn account_config_from_config(
    config: &dyn ConfigPort,
) -> Result<AccountConfig, ConfluenceError> {
    validate_initial_balance(config)?;
    validate_fee_rate(config)?;

    Ok(AccountConfig {
        initial_balance: config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE),
        costs: TradingCostModel::new(config.get_double("backtest", "fee_rate", 0.0)),
        adjust_parameters: config.get_bool("strategy", "adjust", false),
    })
}

/// Strategy parameters from `[strategy]`; missing or unusable keys take their defaults.
pub fn strategy_params_from_config(config: &dyn ConfigPort) -> StrategyParams {
    let period = |key: &str, default: usize| -> usize {
        usize::try_from(config.get_int("strategy", key, default as i64)).unwrap_or(default)
    };
    let level = |key: &str, default: f64| config.get_double("strategy", key, default);

    StrategyParams {
        bb_length: period("bb_length", strategy::DEFAULT_BB_LENGTH),
        bb_std: level("bb_std", strategy::DEFAULT_BB_STD),
        rsi_length: period("rsi_length", strategy::DEFAULT_RSI_LENGTH),
        rsi_buy: level("rsi_buy", strategy::DEFAULT_RSI_BUY),
        rsi_sell: level("rsi_sell", strategy::DEFAULT_RSI_SELL),
        macd_fast: period("macd_fast", strategy::DEFAULT_MACD_FAST),
        macd_slow: period("macd_slow", strategy::DEFAULT_MACD_SLOW),
        macd_signal: period("macd_signal", strategy::DEFAULT_MACD_SIGNAL),
        sma_length: period("sma_length", strategy::DEFAULT_SMA_LENGTH),
    }
    .sanitized()
}

pub fn data_dir(config: &dyn ConfigPort) -> String {
    config
        .get_string("backtest", "data_dir")
        .filter(|s| !s.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_DATA_DIR.to_string())
}

fn validate_initial_balance(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    let value = config.get_double("backtest", "initial_balance", DEFAULT_INITIAL_BALANCE);
    if !(value > 0.0) || !value.is_finite() {
        return Err(ConfluenceError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "initial_balance".to_string(),
            reason: "initial_balance must be positive".to_string(),
        });
    }
    Ok(())
}

fn validate_fee_rate(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    let value = config.get_double("backtest", "fee_rate", 0.0);
    if !(0.0..1.0).contains(&value) {
        return Err(ConfluenceError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "fee_rate".to_string(),
            reason: "fee_rate must be in [0, 1)".to_string(),
        });
    }
    Ok(())
}

fn validate_dates(config: &dyn ConfigPort) -> Result<(), ConfluenceError> {
    let (start_date, end_date) = parse_dates(config)?;
    if start_date >= end_date {
        return Err(ConfluenceError::ConfigInvalid {
            section: "backtest".to_string(),
            key: "start_date".to_string(),
            reason: "start_date must be before end_date".to_string(),
        });
    }
    Ok(())
}

fn parse_dates(config: &dyn ConfigPort) -> Result<(NaiveDateTime, NaiveDateTime), ConfluenceError> {
    let start_date = parse_date(config.get_string("backtest", "start_date").as_deref(), "start_date")?;
    let end_date = parse_date(config.get_string("backtest", "end_date").as_deref(), "end_date")?;
    Ok((start_date, end_date))
}

fn parse_date(value: Option<&str>, field: &str) -> Result<NaiveDateTime, ConfluenceError> {
    match value {
        None => Err(ConfluenceError::ConfigMissing {
            section: "backtest".to_string(),
            key: field.to_string(),
        }),
        Some(s) => parse_timestamp(s).map_err(|_| ConfluenceError::ConfigInvalid {
            section: "backtest".to_string(),
            key: field.to_string(),
            reason: format!("invalid {} format, expected YYYY-MM-DD or RFC 3339", field),
        }),
    }
}

fn required_string(config: &dyn ConfigPort, key: &str) -> Result<String, ConfluenceError> {
    match config.get_string("backtest", key) {
        Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
        _ => Err(ConfluenceError::ConfigMissing {
            section: "backtest".to_string(),
            key: key.to_string(),
        }),
    }
}

fn validate_required(config: &dyn ConfigPort, key: &str) -> Result<(), ConfluenceError> {
    required_string(config, key).map(|_| ())
}

//! CLI definition and dispatch.

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;

use crate::adapters::csv_adapter::CsvCandleSource;
use crate::adapters::file_config_adapter::FileConfigAdapter;
use crate::adapters::log_order_sink::LogOrderSink;
use crate::domain::backtest::{run_backtest as run_backtest_engine, BacktestConfig};
use crate::domain::config_validation::{
    account_config_from_config, backtest_config_from_config, data_dir,
    strategy_params_from_config, AccountConfig,
};
use crate::domain::decision::{self, OrderDecision};
use crate::domain::error::ConfluenceError;
use crate::domain::indicator::IndicatorFrame;
use crate::domain::report::BacktestReport;
use crate::domain::strategy::StrategyParams;
use crate::ports::config_port::ConfigPort;
use crate::ports::data_port::CandleSource;
use crate::ports::order_port::OrderSink;

/// Bars fetched for a live decision, on top of the indicator lookback.
const DECISION_HISTORY_MARGIN: usize = 50;

pub const DEFAULT_LISTEN: &str = "127.0.0.1:3000";

#[derive(Parser, Debug)]
#[command(name = "confluence", about = "Indicator-confluence strategy backtester")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run a backtest
    Backtest {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        interval: Option<String>,
        /// Print the report as JSON on stdout
        #[arg(long)]
        json: bool,
        /// Also write the JSON report to this file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Validate a configuration file and show the resolved parameters
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
    /// Decide an order for the newest candle
    Decide {
        #[arg(short, long)]
        config: PathBuf,
        #[arg(long)]
        symbol: Option<String>,
        #[arg(long)]
        interval: Option<String>,
        #[arg(long, value_enum, default_value_t = DecisionMode::Confluence)]
        mode: DecisionMode,
        #[arg(long, default_value_t = decision::DEFAULT_ORDER_QUANTITY)]
        quantity: f64,
    },
    /// Start the JSON API server
    Serve {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecisionMode {
    /// All four indicator conditions, as in the backtest
    Confluence,
    /// RSI 14 against 30/70 only
    Rsi,
}

pub fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Backtest {
            config,
            symbol,
            interval,
            json,
            output,
        } => run_backtest(
            &config,
            symbol.as_deref(),
            interval.as_deref(),
            json,
            output.as_ref(),
        ),
        Command::Validate { config } => run_validate(&config),
        Command::Decide {
            config,
            symbol,
            interval,
            mode,
            quantity,
        } => run_decide(&config, symbol.as_deref(), interval.as_deref(), mode, quantity),
        Command::Serve { config } => run_serve(&config),
    }
}

pub fn load_config(path: &PathBuf) -> Result<FileConfigAdapter, ExitCode> {
    FileConfigAdapter::from_file(path).map_err(|err| {
        eprintln!("error: {err}");
        ExitCode::from(&err)
    })
}

/// `[backtest]` with command-line overrides applied.
pub fn resolve_backtest_config(
    adapter: &dyn ConfigPort,
    symbol_override: Option<&str>,
    interval_override: Option<&str>,
) -> Result<BacktestConfig, ConfluenceError> {
    let mut config = backtest_config_from_config(adapter)?;
    if let Some(symbol) = symbol_override.filter(|s| !s.trim().is_empty()) {
        config.symbol = symbol.trim().to_string();
    }
    if let Some(interval) = interval_override.filter(|s| !s.trim().is_empty()) {
        config.interval = interval.trim().to_string();
    }
    Ok(config)
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ServeSettings {
    pub listen: SocketAddr,
    pub account: AccountConfig,
}

/// `[web] listen` plus the validated account settings every request runs with.
pub fn resolve_serve_settings(adapter: &dyn ConfigPort) -> Result<ServeSettings, ConfluenceError> {
    let account = account_config_from_config(adapter)?;
    let listen = adapter
        .get_string("web", "listen")
        .unwrap_or_else(|| DEFAULT_LISTEN.to_string());
    let listen: SocketAddr = listen
        .trim()
        .parse()
        .map_err(|_| ConfluenceError::ConfigInvalid {
            section: "web".into(),
            key: "listen".into(),
            reason: format!("not a socket address: {listen}"),
        })?;
    Ok(ServeSettings { listen, account })
}

/// Fetch candles for `config` and run the engine over them.
pub fn run_backtest_pipeline(
    source: &dyn CandleSource,
    params: &StrategyParams,
    config: &BacktestConfig,
) -> Result<BacktestReport, ConfluenceError> {
    let candles =
        source.fetch_candles(&config.symbol, &config.interval, config.start_date, config.end_date)?;
    if candles.is_empty() {
        eprintln!(
            "warning: no candles for {} ({}) in range",
            config.symbol, config.interval
        );
    }
    Ok(run_backtest_engine(&candles, params, config))
}

/// Order decision for the newest candle of `symbol`/`interval`.
pub fn decide_pipeline(
    source: &dyn CandleSource,
    params: &StrategyParams,
    symbol: &str,
    interval: &str,
    mode: DecisionMode,
    quantity: f64,
) -> Result<OrderDecision, ConfluenceError> {
    let limit = params.lookback().max(decision::DEFAULT_RSI_PERIOD) + DECISION_HISTORY_MARGIN;
    let candles = source.recent_candles(symbol, interval, limit)?;
    if candles.is_empty() {
        return Err(ConfluenceError::NoData {
            symbol: symbol.to_string(),
            interval: interval.to_string(),
        });
    }

    Ok(match mode {
        DecisionMode::Confluence => {
            let frame = IndicatorFrame::compute(&candles, params);
            decision::decide_from_frame(&frame, params, quantity)
        }
        DecisionMode::Rsi => decision::decide_from_rsi(
            &crate::domain::candle::closes(&candles),
            decision::DEFAULT_RSI_PERIOD,
            decision::DEFAULT_RSI_OVERSOLD,
            decision::DEFAULT_RSI_OVERBOUGHT,
            quantity,
        ),
    })
}

fn run_backtest(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    interval_override: Option<&str>,
    json: bool,
    output_path: Option<&PathBuf>,
) -> ExitCode {
    // Stage 1: Load config
    eprintln!("Loading config from {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    // Stage 2: Validate and resolve
    let bt_config = match resolve_backtest_config(&adapter, symbol_override, interval_override) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let params = strategy_params_from_config(&adapter);

    // Stage 3: Fetch and simulate
    let source = CsvCandleSource::new(PathBuf::from(data_dir(&adapter)));
    eprintln!(
        "Running backtest for {} ({}) {} → {}",
        bt_config.symbol, bt_config.interval, bt_config.start_date, bt_config.end_date
    );
    let report = match run_backtest_pipeline(&source, &params, &bt_config) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    // Stage 4: Output
    if output_path.is_some() || json {
        let rendered = match serde_json::to_string_pretty(&report) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: failed to serialise report: {e}");
                return ExitCode::from(1);
            }
        };
        if let Some(path) = output_path {
            if let Err(e) = fs::write(path, &rendered) {
                let err = ConfluenceError::from(e);
                eprintln!("error: {err}");
                return (&err).into();
            }
            eprintln!("Report written to {}", path.display());
        }
        if json {
            println!("{rendered}");
        }
    }

    eprint!("\n{}", report.summary());
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    eprintln!("Validating config: {}", config_path.display());
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let bt_config = match backtest_config_from_config(&adapter) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };
    let params = strategy_params_from_config(&adapter);

    eprintln!("\nBacktest:");
    eprintln!("  Market:   {} ({})", bt_config.symbol, bt_config.interval);
    eprintln!("  Range:    {} → {}", bt_config.start_date, bt_config.end_date);
    eprintln!("  Balance:  {:.2}", bt_config.initial_balance);
    eprintln!("  Fee rate: {}", bt_config.costs.fee_rate);
    eprintln!("  Data dir: {}", data_dir(&adapter));

    eprintln!("\nStrategy:");
    for indicator in params.indicators() {
        eprintln!("  {}", indicator);
    }
    eprintln!("  RSI buy < {}, sell > {}", params.rsi_buy, params.rsi_sell);
    eprintln!("  Lookback: {} bars", params.lookback());
    if bt_config.adjust_parameters {
        eprintln!("  Volatility adjustment: on");
    }

    eprintln!("\nConfig is valid.");
    ExitCode::SUCCESS
}

fn run_decide(
    config_path: &PathBuf,
    symbol_override: Option<&str>,
    interval_override: Option<&str>,
    mode: DecisionMode,
    quantity: f64,
) -> ExitCode {
    let adapter = match load_config(config_path) {
        Ok(a) => a,
        Err(code) => return code,
    };

    let symbol = symbol_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", "symbol"))
        .unwrap_or_else(|| "BTCUSDT".to_string());
    let interval = interval_override
        .map(str::to_string)
        .or_else(|| adapter.get_string("backtest", "interval"))
        .unwrap_or_else(|| "1m".to_string());
    let params = strategy_params_from_config(&adapter);
    let source = CsvCandleSource::new(PathBuf::from(data_dir(&adapter)));

    let decision = match decide_pipeline(&source, &params, &symbol, &interval, mode, quantity) {
        Ok(d) => d,
        Err(e) => {
            eprintln!("error: {e}");
            return (&e).into();
        }
    };

    match serde_json::to_string(&decision) {
        Ok(s) => println!("{s}"),
        Err(e) => {
            eprintln!("error: failed to serialise decision: {e}");
            return ExitCode::from(1);
        }
    }

    if let Err(e) = LogOrderSink.submit(&symbol, &decision) {
        eprintln!("error: {e}");
        return (&e).into();
    }
    ExitCode::SUCCESS
}

fn run_serve(config_path: &PathBuf) -> ExitCode {
    #[cfg(feature = "web")]
    {
        use crate::adapters::web::{build_router, AppState};
        use std::sync::Arc;

        eprintln!("Loading config from {}", config_path.display());
        let config = match load_config(config_path) {
            Ok(c) => c,
            Err(code) => return code,
        };

        let settings = match resolve_serve_settings(&config) {
            Ok(s) => s,
            Err(err) => {
                eprintln!("error: {err}");
                return (&err).into();
            }
        };
        let addr = settings.listen;

        let state = AppState {
            source: Arc::new(CsvCandleSource::new(PathBuf::from(data_dir(&config)))),
            initial_balance: settings.account.initial_balance,
            costs: settings.account.costs,
            adjust_parameters: settings.account.adjust_parameters,
        };
        let router = build_router(state);

        eprintln!("Starting web server on {}", addr);

        let runtime = match tokio::runtime::Runtime::new() {
            Ok(rt) => rt,
            Err(e) => {
                let err = ConfluenceError::from(e);
                eprintln!("error: {err}");
                return (&err).into();
            }
        };
        let served = runtime.block_on(async {
            let listener = tokio::net::TcpListener::bind(addr).await?;
            axum::serve(listener, router).await
        });

        match served {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                let err = ConfluenceError::from(e);
                eprintln!("error: {err}");
                (&err).into()
            }
        }
    }

    #[cfg(not(feature = "web"))]
    {
        let _ = config_path;
        eprintln!("error: web feature is required for serve");
        ExitCode::from(1)
    }
}

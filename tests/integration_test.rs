//! End-to-end pipeline tests: candle source → indicators → signals → report.
//!
//! Golden values were computed independently with plain floating-point
//! reference code for the same indicator definitions.

mod common;

use approx::assert_relative_eq;
use common::*;
use confluence::cli::run_backtest_pipeline;
use confluence::domain::backtest::run_backtest;
use confluence::domain::error::ConfluenceError;
use confluence::domain::execution::TradingCostModel;
use confluence::domain::indicator::IndicatorFrame;
use confluence::domain::signal::{generate_signals, Signal};
use confluence::domain::strategy::StrategyParams;

fn signal_string(signals: &[Signal]) -> String {
    signals
        .iter()
        .map(|s| match s {
            Signal::Buy => 'B',
            Signal::Sell => 'S',
            Signal::Hold => 'H',
        })
        .collect()
}

mod golden_hold {
    use super::*;

    #[test]
    fn every_signal_is_hold() {
        let candles = candles_from_closes(&GOLDEN_HOLD_CLOSES);
        let params = golden_hold_params();
        let frame = IndicatorFrame::compute(&candles, &params);
        assert_eq!(signal_string(&generate_signals(&frame, &params)), "HHHHHHHHHHH");
    }

    #[test]
    fn report_has_no_trades_and_unchanged_balance() {
        let candles = candles_from_closes(&GOLDEN_HOLD_CLOSES);
        let report = run_backtest(
            &candles,
            &golden_hold_params(),
            &sample_config(TradingCostModel::frictionless()),
        );
        assert_eq!(report.num_trades, 0);
        assert_eq!(report.winning_trades, 0);
        assert_eq!(report.losing_trades, 0);
        assert_eq!(report.final_balance, 10_000.0);
        assert_eq!(report.total_return_pct, 0.0);
        assert_eq!(report.win_rate, 0.0);
        assert_eq!(report.avg_profit_per_trade, 0.0);
        assert!(report.trades.is_empty());
        assert!(report.open_position.is_none());
    }

    #[test]
    fn rsi_values_pinned() {
        let candles = candles_from_closes(&GOLDEN_HOLD_CLOSES);
        let frame = IndicatorFrame::compute(&candles, &golden_hold_params());
        let expected = [
            f64::NAN,
            f64::NAN,
            0.0,
            0.0,
            33.333333,
            66.666667,
            100.0,
            100.0,
            100.0,
            66.666667,
            33.333333,
        ];
        for (i, (&got, &want)) in frame.rsi.iter().zip(expected.iter()).enumerate() {
            if want.is_nan() {
                assert!(got.is_nan(), "rsi[{i}] = {got}");
            } else {
                assert_relative_eq!(got, want, epsilon = 1e-5);
            }
        }
    }

    #[test]
    fn bollinger_values_pinned() {
        let candles = candles_from_closes(&GOLDEN_HOLD_CLOSES);
        let frame = IndicatorFrame::compute(&candles, &golden_hold_params());
        let middle = [95.0, 90.0, 88.333333, 90.0, 95.0, 100.0, 105.0, 106.666667, 105.0];
        let upper = [105.0, 100.0, 94.106836, 100.0, 105.0, 110.0, 115.0, 112.440169, 115.0];
        let lower = [85.0, 80.0, 82.559831, 80.0, 85.0, 90.0, 95.0, 100.893164, 95.0];

        assert!(frame.bb_middle[0].is_nan() && frame.bb_middle[1].is_nan());
        assert!(frame.bb_upper[1].is_nan() && frame.bb_lower[1].is_nan());
        for i in 0..middle.len() {
            assert_relative_eq!(frame.bb_middle[i + 2], middle[i], epsilon = 1e-5);
            assert_relative_eq!(frame.bb_upper[i + 2], upper[i], epsilon = 1e-5);
            assert_relative_eq!(frame.bb_lower[i + 2], lower[i], epsilon = 1e-5);
        }
    }

    #[test]
    fn macd_has_no_warmup() {
        let candles = candles_from_closes(&GOLDEN_HOLD_CLOSES);
        let frame = IndicatorFrame::compute(&candles, &golden_hold_params());
        assert_eq!(frame.macd_line[0], 0.0);
        assert_relative_eq!(frame.macd_line[10], 0.708745, epsilon = 1e-5);
        assert_relative_eq!(frame.macd_signal[10], -0.303979, epsilon = 1e-5);
        // default SMA(50) never defines on 11 bars
        assert!(frame.sma.iter().all(|v| v.is_nan()));
    }
}

mod golden_trade {
    use super::*;

    const ENTRY: f64 = 236.71;
    const EXIT: f64 = 257.76;
    const PROFIT_PCT: f64 = 8.892737949389542;

    #[test]
    fn signals_pinned() {
        let candles = candles_from_closes(&GOLDEN_TRADE_CLOSES);
        let params = golden_trade_params();
        let frame = IndicatorFrame::compute(&candles, &params);
        assert_eq!(
            signal_string(&generate_signals(&frame, &params)),
            "HHHHHHHHHHHHHBHHHHHHHHHHHHHHHHSHHH"
        );
    }

    #[test]
    fn one_round_trip_without_fees() {
        let candles = candles_from_closes(&GOLDEN_TRADE_CLOSES);
        let report = run_backtest(
            &candles,
            &golden_trade_params(),
            &sample_config(TradingCostModel::frictionless()),
        );

        assert_eq!(report.num_trades, 1);
        assert_eq!(report.winning_trades, 1);
        assert_eq!(report.losing_trades, 0);
        let trade = &report.trades[0];
        assert_eq!(trade.entry_price, ENTRY);
        assert_eq!(trade.exit_price, EXIT);
        assert_eq!(trade.entry_time, candles[13].time);
        assert_eq!(trade.exit_time, candles[30].time);
        assert_relative_eq!(trade.profit_pct, PROFIT_PCT, epsilon = 1e-9);
        assert_relative_eq!(trade.profit_amount, 889.2737949389541, epsilon = 1e-6);
        assert_relative_eq!(report.final_balance, 10_889.273794938954, epsilon = 1e-6);
        assert_relative_eq!(report.total_return_pct, 8.892737949389542, epsilon = 1e-6);
        assert_relative_eq!(report.win_rate, 100.0);
        assert_relative_eq!(report.avg_profit_per_trade, PROFIT_PCT, epsilon = 1e-9);
    }

    #[test]
    fn one_round_trip_with_fees() {
        let candles = candles_from_closes(&GOLDEN_TRADE_CLOSES);
        let report = run_backtest(
            &candles,
            &golden_trade_params(),
            &sample_config(TradingCostModel::new(0.001)),
        );

        assert_eq!(report.num_trades, 1);
        // fees do not change the gross percentage
        assert_relative_eq!(report.trades[0].profit_pct, PROFIT_PCT, epsilon = 1e-9);
        assert_relative_eq!(report.trades[0].profit_amount, 869.2737949389541, epsilon = 1e-6);
        assert_relative_eq!(report.final_balance, 10_869.273794938954, epsilon = 1e-6);
    }

    #[test]
    fn fees_never_increase_final_balance() {
        let candles = candles_from_closes(&GOLDEN_TRADE_CLOSES);
        let params = golden_trade_params();
        let balances: Vec<f64> = [0.0, 0.001, 0.01]
            .iter()
            .map(|&fee| {
                run_backtest(&candles, &params, &sample_config(TradingCostModel::new(fee)))
                    .final_balance
            })
            .collect();
        assert!(balances[1] <= balances[0]);
        assert!(balances[2] <= balances[1]);
        assert_relative_eq!(balances[2], 10_689.273794938954, epsilon = 1e-6);
    }

    #[test]
    fn open_position_at_end_is_excluded() {
        // truncated after the buy at index 13, before the sell
        let candles = candles_from_closes(&GOLDEN_TRADE_CLOSES[..20]);
        let report = run_backtest(
            &candles,
            &golden_trade_params(),
            &sample_config(TradingCostModel::frictionless()),
        );

        assert_eq!(report.num_trades, 0);
        assert_eq!(report.final_balance, 10_000.0);
        let open = report.open_position.expect("buy at index 13 stays open");
        assert_eq!(open.entry_price, ENTRY);
        assert_eq!(open.entry_time, candles[13].time);
    }
}

mod pipeline {
    use super::*;

    #[test]
    fn pipeline_with_mock_source() {
        let source = MockCandleSource::new().with_candles(
            "BTCUSDT",
            "1h",
            candles_from_closes(&GOLDEN_TRADE_CLOSES),
        );
        let report = run_backtest_pipeline(
            &source,
            &golden_trade_params(),
            &sample_config(TradingCostModel::frictionless()),
        )
        .unwrap();
        assert_eq!(report.symbol, "BTCUSDT");
        assert_eq!(report.num_trades, 1);
    }

    #[test]
    fn empty_source_gives_zero_trade_report() {
        let source = MockCandleSource::new();
        let report = run_backtest_pipeline(
            &source,
            &StrategyParams::default(),
            &sample_config(TradingCostModel::frictionless()),
        )
        .unwrap();
        assert_eq!(report.num_trades, 0);
        assert_eq!(report.final_balance, report.initial_balance);
    }

    #[test]
    fn source_error_propagates() {
        let source = MockCandleSource::new().with_error("BTCUSDT", "1h", "connection reset");
        let err = run_backtest_pipeline(
            &source,
            &StrategyParams::default(),
            &sample_config(TradingCostModel::frictionless()),
        )
        .unwrap_err();
        assert!(
            matches!(err, ConfluenceError::DataSource { ref reason } if reason == "connection reset")
        );
    }

    #[test]
    fn range_outside_data_gives_zero_trades() {
        let source = MockCandleSource::new().with_candles(
            "BTCUSDT",
            "1h",
            candles_from_closes(&GOLDEN_TRADE_CLOSES),
        );
        let mut config = sample_config(TradingCostModel::frictionless());
        config.start_date = datetime(2025, 1, 1);
        config.end_date = datetime(2025, 2, 1);
        let report = run_backtest_pipeline(&source, &golden_trade_params(), &config).unwrap();
        assert_eq!(report.num_trades, 0);
    }

    #[test]
    fn invalid_params_fall_back_to_defaults() {
        let candles = candles_from_closes(&GOLDEN_TRADE_CLOSES);
        let broken = StrategyParams {
            bb_length: 0,
            rsi_length: 0,
            sma_length: 0,
            bb_std: f64::INFINITY,
            ..StrategyParams::default()
        };
        let config = sample_config(TradingCostModel::frictionless());
        assert_eq!(
            run_backtest(&candles, &broken, &config),
            run_backtest(&candles, &StrategyParams::default(), &config)
        );
    }

    #[test]
    fn adjustment_on_balanced_series_still_holds() {
        let candles = candles_from_closes(&GOLDEN_HOLD_CLOSES);
        let mut config = sample_config(TradingCostModel::frictionless());
        config.adjust_parameters = true;
        let report = run_backtest(&candles, &golden_hold_params(), &config);
        assert_eq!(report.num_trades, 0);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let candles = candles_from_closes(&GOLDEN_TRADE_CLOSES);
        let params = golden_trade_params();
        let config = sample_config(TradingCostModel::new(0.001));
        assert_eq!(
            run_backtest(&candles, &params, &config),
            run_backtest(&candles, &params, &config)
        );
    }

    #[test]
    fn parallel_backtests_do_not_interfere() {
        let candles = candles_from_closes(&GOLDEN_TRADE_CLOSES);
        let params = golden_trade_params();
        let fees = [0.0, 0.001, 0.002, 0.005];

        let sequential: Vec<f64> = fees
            .iter()
            .map(|&fee| {
                run_backtest(&candles, &params, &sample_config(TradingCostModel::new(fee)))
                    .final_balance
            })
            .collect();

        let parallel: Vec<f64> = std::thread::scope(|scope| {
            let handles: Vec<_> = fees
                .iter()
                .map(|&fee| {
                    let candles = &candles;
                    let params = &params;
                    scope.spawn(move || {
                        run_backtest(candles, params, &sample_config(TradingCostModel::new(fee)))
                            .final_balance
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        assert_eq!(sequential, parallel);
    }
}

mod indicator_properties {
    use super::*;

    #[test]
    fn constant_series() {
        let candles = candles_from_closes(&[42.0; 30]);
        let params = StrategyParams {
            bb_length: 5,
            rsi_length: 5,
            sma_length: 5,
            ..StrategyParams::default()
        };
        let frame = IndicatorFrame::compute(&candles, &params);
        for i in 4..30 {
            assert_relative_eq!(frame.sma[i], 42.0);
            assert_relative_eq!(frame.bb_middle[i], 42.0);
            assert_relative_eq!(frame.bb_upper[i], frame.bb_lower[i]);
            assert!(frame.rsi[i].is_nan());
        }
        let signals = generate_signals(&frame, &params);
        assert!(signals.iter().all(|s| *s == Signal::Hold));
    }

    #[test]
    fn strictly_increasing_series_rsi_is_100() {
        let closes: Vec<f64> = (0..40).map(|i| 100.0 + i as f64 * 1.5).collect();
        let candles = candles_from_closes(&closes);
        let frame = IndicatorFrame::compute(&candles, &StrategyParams::default());
        for i in 14..40 {
            assert_eq!(frame.rsi[i], 100.0);
        }
    }
}

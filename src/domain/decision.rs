//! Order decisions for the newest bar.
//!
//! A decision is what would be sent to an [`OrderSink`](crate::ports::order_port::OrderSink);
//! nothing in the backtest path submits one.

use serde::{Deserialize, Serialize};

use super::indicator::{calculate_rsi, IndicatorFrame};
use super::signal::{evaluate_row, Signal};
use super::strategy::StrategyParams;

pub const DEFAULT_ORDER_QUANTITY: f64 = 0.01;
pub const DEFAULT_RSI_PERIOD: usize = 14;
pub const DEFAULT_RSI_OVERSOLD: f64 = 30.0;
pub const DEFAULT_RSI_OVERBOUGHT: f64 = 70.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderAction {
    Buy,
    Sell,
    Hold,
}

impl From<Signal> for OrderAction {
    fn from(signal: Signal) -> Self {
        match signal {
            Signal::Buy => OrderAction::Buy,
            Signal::Sell => OrderAction::Sell,
            Signal::Hold => OrderAction::Hold,
        }
    }
}

impl std::fmt::Display for OrderAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OrderAction::Buy => write!(f, "buy"),
            OrderAction::Sell => write!(f, "sell"),
            OrderAction::Hold => write!(f, "hold"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrderDecision {
    pub action: OrderAction,
    pub quantity: f64,
}

impl OrderDecision {
    /// Hold always carries zero quantity.
    pub fn new(action: OrderAction, quantity: f64) -> Self {
        let quantity = match action {
            OrderAction::Hold => 0.0,
            _ => quantity,
        };
        OrderDecision { action, quantity }
    }

    pub fn hold() -> Self {
        OrderDecision::new(OrderAction::Hold, 0.0)
    }

    pub fn is_actionable(&self) -> bool {
        self.action != OrderAction::Hold
    }
}

/// Confluence signal of the newest row. A frame with fewer than two rows holds,
/// matching the first-row rule of signal generation.
pub fn decide_from_frame(
    frame: &IndicatorFrame<'_>,
    params: &StrategyParams,
    quantity: f64,
) -> OrderDecision {
    if frame.len() < 2 {
        return OrderDecision::hold();
    }
    match frame.last_row() {
        Some(row) => OrderDecision::new(evaluate_row(&row, params).into(), quantity),
        None => OrderDecision::hold(),
    }
}

/// Plain RSI threshold decision on the latest close.
pub fn decide_from_rsi(
    closes: &[f64],
    period: usize,
    oversold: f64,
    overbought: f64,
    quantity: f64,
) -> OrderDecision {
    let latest = calculate_rsi(closes, period)
        .last()
        .copied()
        .unwrap_or(f64::NAN);

    if latest < oversold {
        OrderDecision::new(OrderAction::Buy, quantity)
    } else if latest > overbought {
        OrderDecision::new(OrderAction::Sell, quantity)
    } else {
        OrderDecision::hold()
    }
}

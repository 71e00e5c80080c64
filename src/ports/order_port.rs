//! Order execution port trait.

use crate::domain::decision::OrderDecision;
use crate::domain::error::ConfluenceError;

/// Destination for live order decisions. The backtest engine never submits.
pub trait OrderSink {
    fn submit(&self, symbol: &str, decision: &OrderDecision) -> Result<(), ConfluenceError>;
}

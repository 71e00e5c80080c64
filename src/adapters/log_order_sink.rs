//! Order sink that records decisions to the log instead of an exchange.

use crate::domain::decision::OrderDecision;
use crate::domain::error::ConfluenceError;
use crate::ports::order_port::OrderSink;
use tracing::info;

/// Dry-run sink. Holds are skipped; everything else is logged as a market order.
#[derive(Debug, Default)]
pub struct LogOrderSink;

impl OrderSink for LogOrderSink {
    fn submit(&self, symbol: &str, decision: &OrderDecision) -> Result<(), ConfluenceError> {
        if !decision.is_actionable() {
            return Ok(());
        }
        if !(decision.quantity > 0.0) {
            return Err(ConfluenceError::OrderSink {
                reason: format!("quantity must be positive, got {}", decision.quantity),
            });
        }
        info!(
            symbol,
            side = %decision.action,
            quantity = decision.quantity,
            "market order (dry run)"
        );
        Ok(())
    }
}

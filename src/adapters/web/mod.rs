//! JSON HTTP adapter.
//!
//! Exposes recent candles and on-demand backtests over a small axum API.
//! The engine is synchronous, so every handler hops onto the blocking pool.

mod error;
mod handlers;

pub use error::WebError;
pub use handlers::*;

use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::domain::execution::TradingCostModel;
use crate::ports::data_port::CandleSource;

pub struct AppState {
    pub source: Arc<dyn CandleSource>,
    pub initial_balance: f64,
    pub costs: TradingCostModel,
    pub adjust_parameters: bool,
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/api/historical_data", get(handlers::historical_data))
        .route("/api/backtest", post(handlers::run_backtest))
        .fallback(handlers::not_found)
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(Arc::new(state))
}

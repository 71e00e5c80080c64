//! HTTP error responses for the web adapter.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;

use crate::domain::error::ConfluenceError;

#[derive(Debug)]
pub struct WebError {
    pub status: StatusCode,
    pub message: String,
}

impl WebError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

pub fn status_from_error(err: &ConfluenceError) -> StatusCode {
    match err {
        ConfluenceError::ConfigMissing { .. }
        | ConfluenceError::ConfigInvalid { .. }
        | ConfluenceError::ConfigParse { .. }
        | ConfluenceError::InvalidDate { .. } => StatusCode::BAD_REQUEST,
        ConfluenceError::NoData { .. } => StatusCode::NOT_FOUND,
        ConfluenceError::DataSource { .. } => StatusCode::BAD_GATEWAY,
        ConfluenceError::OrderSink { .. } | ConfluenceError::Io(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl From<ConfluenceError> for WebError {
    fn from(err: ConfluenceError) -> Self {
        Self::new(status_from_error(&err), err.to_string())
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            tracing::warn!(status = %self.status, error = %self.message, "request failed");
        }
        (self.status, Json(json!({ "error": self.message }))).into_response()
    }
}

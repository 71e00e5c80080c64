//! Domain error types.

/// Top-level error type for confluence.
///
/// The engine itself is infallible; these errors come from the edges
/// (configuration, candle sources, request parsing).
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    #[error("config parse error in {file}: {reason}")]
    ConfigParse { file: String, reason: String },

    #[error("missing config key [{section}] {key}")]
    ConfigMissing { section: String, key: String },

    #[error("invalid config value [{section}] {key}: {reason}")]
    ConfigInvalid {
        section: String,
        key: String,
        reason: String,
    },

    #[error("invalid date {value:?}: expected YYYY-MM-DD, YYYY-MM-DDTHH:MM:SS or RFC 3339")]
    InvalidDate { value: String },

    #[error("candle source error: {reason}")]
    DataSource { reason: String },

    #[error("no data for {symbol} ({interval})")]
    NoData { symbol: String, interval: String },

    #[error("order sink error: {reason}")]
    OrderSink { reason: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<&ConfluenceError> for std::process::ExitCode {
    fn from(err: &ConfluenceError) -> Self {
        let code: u8 = match err {
            ConfluenceError::Io(_) => 1,
            ConfluenceError::ConfigParse { .. }
            | ConfluenceError::ConfigMissing { .. }
            | ConfluenceError::ConfigInvalid { .. }
            | ConfluenceError::InvalidDate { .. } => 2,
            ConfluenceError::OrderSink { .. } => 3,
            ConfluenceError::DataSource { .. } | ConfluenceError::NoData { .. } => 5,
        };
        std::process::ExitCode::from(code)
    }
}

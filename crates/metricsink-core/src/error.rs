//! Shared error type across metricsink crates.

use thiserror::Error;

use crate::observer::FlushStage;

/// Stable error codes for logs and HTTP responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCode {
    /// Store or config values cannot produce a working store.
    Configuration,
    /// Invalid input / malformed config.
    BadRequest,
    /// File open/write/sync failure.
    Io,
    /// Start/stop called out of order.
    Lifecycle,
    /// Internal failure.
    Internal,
}

impl ErrorCode {
    /// String representation used in logs and responses.
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::Configuration => "CONFIGURATION",
            ErrorCode::BadRequest => "BAD_REQUEST",
            ErrorCode::Io => "IO",
            ErrorCode::Lifecycle => "LIFECYCLE",
            ErrorCode::Internal => "INTERNAL",
        }
    }
}

/// Shared result type.
pub type Result<T> = std::result::Result<T, MetricSinkError>;

/// Unified error type used by core and gateway.
#[derive(Debug, Error)]
pub enum MetricSinkError {
    #[error("configuration: {0}")]
    Configuration(String),
    #[error("bad request: {0}")]
    BadRequest(String),
    #[error("failed to {stage} file: {source}")]
    Io {
        stage: FlushStage,
        #[source]
        source: std::io::Error,
    },
    #[error("lifecycle: {0}")]
    Lifecycle(String),
    #[error("internal: {0}")]
    Internal(String),
}

impl MetricSinkError {
    /// Wrap an I/O error with the flush stage it happened in.
    pub fn io(stage: FlushStage, source: std::io::Error) -> Self {
        MetricSinkError::Io { stage, source }
    }

    /// Map an error to its stable code.
    pub fn code(&self) -> ErrorCode {
        match self {
            MetricSinkError::Configuration(_) => ErrorCode::Configuration,
            MetricSinkError::BadRequest(_) => ErrorCode::BadRequest,
            MetricSinkError::Io { .. } => ErrorCode::Io,
            MetricSinkError::Lifecycle(_) => ErrorCode::Lifecycle,
            MetricSinkError::Internal(_) => ErrorCode::Internal,
        }
    }
}

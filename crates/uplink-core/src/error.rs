//! Error types module
//!
//! All errors are unified under the `AppError` enum, which can represent
//! store, remote-host, validation, and configuration failures.
//!
//! The `From<redis::RedisError>` conversion is gated behind the `redis`
//! feature so that crates which never touch the store can depend on this one
//! without pulling the client in.

/// Log level for error reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    /// Debug level - for expected errors like validation failures
    Debug,
    /// Warning level - for recoverable issues like a failed remote delete
    Warn,
    /// Error level - for unexpected failures
    Error,
}

/// Metadata for error responses - defines how an error should be presented.
pub trait ErrorMetadata {
    /// HTTP status code to return
    fn http_status_code(&self) -> u16;

    /// Machine-readable error code (e.g., "STORE_ERROR")
    fn error_code(&self) -> &'static str;

    /// Whether this error is recoverable (can be retried)
    fn is_recoverable(&self) -> bool;

    /// Client-facing message (may differ from internal error message)
    fn client_message(&self) -> String;

    /// Log level for this error
    fn log_level(&self) -> LogLevel;
}

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Remote host error: {0}")]
    RemoteHost(String),

    #[error("Store error: {0}")]
    Store(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error("Internal error with source")]
    InternalWithSource {
        message: String,
        #[source]
        source: anyhow::Error,
    },
}

#[cfg(feature = "redis")]
impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::Store(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Store(format!("Record codec error: {}", err))
    }
}

impl ErrorMetadata for AppError {
    fn http_status_code(&self) -> u16 {
        match self {
            AppError::InvalidInput(_) => 400,
            AppError::Unauthorized(_) => 401,
            AppError::NotFound(_) => 404,
            AppError::RemoteHost(_) => 502,
            AppError::Store(_)
            | AppError::Config(_)
            | AppError::Internal(_)
            | AppError::InternalWithSource { .. } => 500,
        }
    }

    fn error_code(&self) -> &'static str {
        match self {
            AppError::InvalidInput(_) => "INVALID_INPUT",
            AppError::Unauthorized(_) => "UNAUTHORIZED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::RemoteHost(_) => "REMOTE_HOST_ERROR",
            AppError::Store(_) => "STORE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::Internal(_) | AppError::InternalWithSource { .. } => "INTERNAL_ERROR",
        }
    }

    fn is_recoverable(&self) -> bool {
        matches!(self, AppError::RemoteHost(_) | AppError::Store(_))
    }

    fn client_message(&self) -> String {
        match self {
            // Internal details stay in the logs
            AppError::Internal(_) | AppError::InternalWithSource { .. } => {
                "Internal server error".to_string()
            }
            AppError::Store(_) => "Storage backend unavailable".to_string(),
            other => other.to_string(),
        }
    }

    fn log_level(&self) -> LogLevel {
        match self {
            AppError::InvalidInput(_) | AppError::NotFound(_) => LogLevel::Debug,
            AppError::Unauthorized(_) | AppError::RemoteHost(_) => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_400() {
        let err = AppError::InvalidInput("size_bytes must be positive".into());
        assert_eq!(err.http_status_code(), 400);
        assert_eq!(err.error_code(), "INVALID_INPUT");
        assert!(!err.is_recoverable());
    }

    #[test]
    fn internal_details_are_not_leaked() {
        let err = AppError::Internal("connection pool poisoned".into());
        assert_eq!(err.client_message(), "Internal server error");
        assert_eq!(err.log_level(), LogLevel::Error);
    }

    #[test]
    fn remote_host_failures_are_recoverable() {
        let err = AppError::RemoteHost("503 from upstream".into());
        assert_eq!(err.http_status_code(), 502);
        assert!(err.is_recoverable());
    }
}

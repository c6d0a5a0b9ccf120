//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// A sink refused or failed a write
    #[error("Sink '{sink}' failed: {message}")]
    SinkError { sink: String, message: String },

    /// A forwarded record could not be routed
    #[error("Invalid forwarded record: {message}")]
    InvalidRecord { message: String },
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create a sink error
    pub fn sink(sink: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::SinkError {
            sink: sink.into(),
            message: message.into(),
        }
    }

    /// Create an invalid record error
    pub fn invalid_record(message: impl Into<String>) -> Self {
        LoggerError::InvalidRecord {
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::sink("memory", "buffer poisoned");
        assert!(matches!(err, LoggerError::SinkError { .. }));

        let err = LoggerError::invalid_record("missing level");
        assert!(matches!(err, LoggerError::InvalidRecord { .. }));
    }

    #[test]
    fn test_error_display() {
        let err = LoggerError::sink("file", "disk full");
        assert_eq!(err.to_string(), "Sink 'file' failed: disk full");

        let err = LoggerError::invalid_record("unknown level 'loud'");
        assert_eq!(
            err.to_string(),
            "Invalid forwarded record: unknown level 'loud'"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("opening log file", "cannot open", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("opening log file"));
        assert!(err.to_string().contains("cannot open"));
    }
}

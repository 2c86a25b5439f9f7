//! Unified error types for hbd.

use thiserror::Error;

/// Result type alias using HbdError.
pub type Result<T> = std::result::Result<T, HbdError>;

#[derive(Error, Debug)]
pub enum HbdError {
    // Data errors
    #[error("Invalid date format: {0} (expected YYYY-MM-DD)")]
    InvalidDateFormat(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Birthday not found: {0}")]
    NotFound(i64),

    // Mail errors
    #[error("Delivery error: {0}")]
    Delivery(String),

    // Persistence errors
    #[error("Store error: {0}")]
    Store(String),

    #[error("Notification log write error: {0}")]
    LogWrite(String),

    // Config errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl HbdError {
    pub fn invalid_date(input: impl Into<String>) -> Self {
        Self::InvalidDateFormat(input.into())
    }

    pub fn delivery(msg: impl Into<String>) -> Self {
        Self::Delivery(msg.into())
    }

    pub fn store(msg: impl Into<String>) -> Self {
        Self::Store(msg.into())
    }

    pub fn log_write(msg: impl Into<String>) -> Self {
        Self::LogWrite(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = HbdError::invalid_date("1990-13-01");
        assert!(err.to_string().contains("1990-13-01"));
        assert!(err.to_string().contains("YYYY-MM-DD"));

        let err = HbdError::NotFound(42);
        assert_eq!(err.to_string(), "Birthday not found: 42");
    }

    #[test]
    fn test_error_constructors() {
        assert!(matches!(HbdError::delivery("x"), HbdError::Delivery(_)));
        assert!(matches!(HbdError::store("x"), HbdError::Store(_)));
        assert!(matches!(HbdError::log_write("x"), HbdError::LogWrite(_)));
        assert!(matches!(HbdError::config("x"), HbdError::Config(_)));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: HbdError = io_err.into();
        assert!(matches!(err, HbdError::Io(_)));
    }
}

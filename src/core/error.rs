//! Error taxonomy shared by the data clients and analytics.

use rust_decimal::Decimal;
use std::fmt::Display;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// Remote fetch failed and nothing usable was cached under `key`.
    #[error("Data unavailable for '{key}': {reason}")]
    DataUnavailable { key: String, reason: String },

    #[error("Portfolio read '{operation}' failed: {reason}")]
    RemoteReadFailed { operation: String, reason: String },

    #[error("Portfolio write '{operation}' failed: {reason}")]
    RemoteWriteFailed { operation: String, reason: String },

    /// A non-positive price was used as a denominator.
    #[error("Invalid price: {0}")]
    InvalidPrice(Decimal),

    #[error("Invalid portfolio entry: {0}")]
    InvalidEntry(String),
}

impl CoreError {
    // `{:#}` keeps the whole context chain of anyhow errors.
    pub(crate) fn read_failed(operation: &str, reason: impl Display) -> Self {
        CoreError::RemoteReadFailed {
            operation: operation.to_string(),
            reason: format!("{reason:#}"),
        }
    }

    pub(crate) fn write_failed(operation: &str, reason: impl Display) -> Self {
        CoreError::RemoteWriteFailed {
            operation: operation.to_string(),
            reason: format!("{reason:#}"),
        }
    }
}

pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_error_messages() {
        let err = CoreError::DataUnavailable {
            key: "spot".to_string(),
            reason: "connection refused".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Data unavailable for 'spot': connection refused"
        );

        let err = CoreError::write_failed("update", "HTTP 404 Not Found");
        assert_eq!(
            err.to_string(),
            "Portfolio write 'update' failed: HTTP 404 Not Found"
        );

        assert_eq!(CoreError::InvalidPrice(dec!(0)).to_string(), "Invalid price: 0");
    }
}

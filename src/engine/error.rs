//! Engine error types
//!
//! Every failure of the bootstrap pipeline maps to exactly one variant, so
//! callers can tell which stage failed and which name caused it.

use thiserror::Error;

use crate::engine::types::DbFamily;

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("Unsupported driver name: {driver}")]
    UnsupportedDriver { driver: String },

    #[error("Unsupported dialect type: {family}")]
    UnsupportedDialect { family: DbFamily },

    #[error("Malformed connection string for driver {driver}: {reason}")]
    MalformedConnectionString { driver: String, reason: String },

    #[error("Connection failed for driver {driver}: {message}")]
    ConnectionError { driver: String, message: String },

    #[error("Failed to initialize {family} dialect: {message}")]
    DialectInitError { family: DbFamily, message: String },

    #[error("Engine is closed")]
    Closed,

    #[error("Query failed: {message}")]
    Query { message: String },
}

impl EngineError {
    pub fn unsupported_driver(driver: impl Into<String>) -> Self {
        Self::UnsupportedDriver {
            driver: driver.into(),
        }
    }

    pub fn unsupported_dialect(family: DbFamily) -> Self {
        Self::UnsupportedDialect { family }
    }

    pub fn malformed(driver: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::MalformedConnectionString {
            driver: driver.into(),
            reason: reason.into(),
        }
    }

    pub fn connection_failed(driver: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConnectionError {
            driver: driver.into(),
            message: message.into(),
        }
    }

    pub fn dialect_init(family: DbFamily, message: impl Into<String>) -> Self {
        Self::DialectInitError {
            family,
            message: message.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::Query {
            message: message.into(),
        }
    }

    /// Short stage label used in log fields.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::UnsupportedDriver { .. } => "driver_lookup",
            Self::MalformedConnectionString { .. } => "parse",
            Self::UnsupportedDialect { .. } => "dialect_lookup",
            Self::ConnectionError { .. } => "open",
            Self::DialectInitError { .. } => "dialect_init",
            Self::Closed => "closed",
            Self::Query { .. } => "query",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_offending_value() {
        let err = EngineError::unsupported_driver("nosuchdriver");
        assert_eq!(err.to_string(), "Unsupported driver name: nosuchdriver");
        assert_eq!(err.stage(), "driver_lookup");

        let err = EngineError::unsupported_dialect(DbFamily::Oracle);
        assert_eq!(err.to_string(), "Unsupported dialect type: oracle");
    }
}

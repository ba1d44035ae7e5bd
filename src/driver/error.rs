// SPDX-License-Identifier: Apache-2.0

//! Normalized error types for driver operations
//!
//! Driver implementations map their backend-specific failures to these
//! variants so callers and the log stream see consistent errors.

use thiserror::Error;

/// Unified error type for all driver operations.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The connection is no longer usable and should be discarded.
    #[error("Bad connection")]
    BadConnection,

    #[error("Connection failed: {message}")]
    ConnectionFailed { message: String },

    #[error("Query execution error: {message}")]
    Execution { message: String },

    /// The driver does not implement the requested optional capability.
    #[error("Feature not supported: {feature}")]
    NotSupported { feature: String },

    #[error("Transaction error: {message}")]
    Transaction { message: String },

    #[error("{object} is closed")]
    Closed { object: String },
}

impl DriverError {
    pub fn connection_failed(msg: impl Into<String>) -> Self {
        Self::ConnectionFailed { message: msg.into() }
    }

    pub fn execution(msg: impl Into<String>) -> Self {
        Self::Execution { message: msg.into() }
    }

    pub fn not_supported(feature: impl Into<String>) -> Self {
        Self::NotSupported { feature: feature.into() }
    }

    pub fn transaction(msg: impl Into<String>) -> Self {
        Self::Transaction { message: msg.into() }
    }

    pub fn closed(object: impl Into<String>) -> Self {
        Self::Closed { object: object.into() }
    }

    /// True when the connection that produced this error must be discarded.
    pub fn is_bad_connection(&self) -> bool {
        matches!(self, Self::BadConnection)
    }

    /// True when the error only signals a missing optional capability.
    pub fn is_not_supported(&self) -> bool {
        matches!(self, Self::NotSupported { .. })
    }
}

/// Result type alias for driver operations.
pub type DriverResult<T> = Result<T, DriverError>;

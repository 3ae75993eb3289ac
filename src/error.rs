//! Unified error type for corral.
//!
//! This module wraps the internal error taxonomy and presents a compact,
//! stable interface to users of the facade.

use corral_core::Value;
use thiserror::Error;

/// All corral errors.
///
/// This is the canonical error type for facade operations. Each variant
/// corresponds to one failure class of the invocation pipeline; the class
/// tells the caller what already happened (whether an instance was
/// consumed, whether a transaction was rolled back) without exposing
/// internal detail.
#[derive(Debug, Error)]
pub enum Error {
    /// Caller lacks a required role; nothing was acquired or started.
    #[error("not authorized: {0}")]
    NotAuthorized(String),

    /// Pool exhausted past the acquire timeout; retry may succeed.
    #[error("unavailable: {0}")]
    Unavailable(String),

    /// Instance construction failed; nothing was exposed.
    #[error("construction failed: {0}")]
    Construction(String),

    /// Contract-declared business failure with its payload.
    #[error("application failure")]
    Application(Value),

    /// Unexpected failure; the instance was discarded and the transaction
    /// rolled back.
    #[error("system failure: {0}")]
    System(String),

    /// Unknown component or method.
    #[error("not found: {0}")]
    NotFound(String),

    /// Deployment-time configuration error.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The component is shutting down.
    #[error("shutting down: {0}")]
    ShuttingDown(String),
}

/// Result type for corral operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Check if this failure may succeed on retry once load subsides.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Unavailable(_))
    }

    /// Check if this is an application-level (contract-declared) failure.
    pub fn is_application(&self) -> bool {
        matches!(self, Error::Application(_))
    }

    /// Check if this is a system-level failure.
    pub fn is_system(&self) -> bool {
        matches!(self, Error::System(_))
    }

    /// Check if this is a missing component or method.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }

    /// The application-failure payload, if this is one.
    pub fn application_payload(&self) -> Option<&Value> {
        match self {
            Error::Application(payload) => Some(payload),
            _ => None,
        }
    }
}

// Convert from internal core errors
impl From<corral_core::Error> for Error {
    fn from(e: corral_core::Error) -> Self {
        use corral_core::Error as CoreError;
        match e {
            CoreError::NotAuthorized { .. } => Error::NotAuthorized(e.to_string()),
            CoreError::Unavailable { .. } => Error::Unavailable(e.to_string()),
            CoreError::Construction { ref source, .. } => {
                Error::Construction(format!("{e}: {source}"))
            }
            CoreError::Application { payload, .. } => Error::Application(payload),
            CoreError::System { reason } => Error::System(reason),
            CoreError::UnknownComponent(_) => Error::NotFound(e.to_string()),
            CoreError::UnknownMethod { .. } => Error::NotFound(e.to_string()),
            CoreError::InvalidConfig(reason) => Error::InvalidConfig(reason),
            CoreError::ShuttingDown(component) => Error::ShuttingDown(component.to_string()),
        }
    }
}

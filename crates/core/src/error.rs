//! Error taxonomy for the invocation pipeline
//!
//! Every failure a caller can observe falls into one of the classes below.
//! The class is load-bearing: it decides whether an instance was ever
//! touched, whether a transaction was rolled back, and whether the worker
//! instance survived the call.
//!
//! | Variant | Instance | Transaction |
//! |---------|----------|-------------|
//! | `NotAuthorized` | never acquired | never started |
//! | `Unavailable` | never acquired | never started |
//! | `Construction` | discarded before exposure | never started |
//! | `Application` | released back to the pool | per declared policy |
//! | `System` | discarded | rolled back |

use crate::types::ComponentId;
use crate::value::Value;
use std::time::Duration;
use thiserror::Error;

/// Result type for container operations.
pub type Result<T> = std::result::Result<T, Error>;

/// All container errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The caller's identity does not satisfy the method's access rule.
    /// Raised before any instance is acquired, so unauthorized traffic
    /// never consumes pool capacity.
    #[error("caller `{caller}` is not authorized to invoke `{method}` on `{component}`")]
    NotAuthorized {
        /// Target component
        component: ComponentId,
        /// Invoked method name
        method: String,
        /// Principal that was rejected
        caller: String,
    },

    /// Strict pooling is enabled, the pool stayed exhausted for the whole
    /// acquire timeout, and the caller was turned away.
    #[error("no instance of `{component}` became available within {waited:?}")]
    Unavailable {
        /// Component whose pool was exhausted
        component: ComponentId,
        /// How long the caller waited before giving up
        waited: Duration,
    },

    /// Instance construction or its post-construct chain failed. The
    /// partially built instance was torn down and never exposed.
    #[error("failed to construct an instance of `{component}`")]
    Construction {
        /// Component whose factory failed
        component: ComponentId,
        /// Underlying construction failure
        #[source]
        source: ConstructionError,
    },

    /// The business method reported an expected, contract-declared failure.
    /// The instance was returned to the pool; the transaction outcome
    /// followed the method's declared policy.
    #[error("application failure from `{component}`")]
    Application {
        /// Component that raised the failure
        component: ComponentId,
        /// Contract-declared failure payload
        payload: Value,
    },

    /// An unexpected failure: a system-classified dispatch outcome, a panic
    /// crossing the dispatch boundary, or a transaction-policy failure.
    /// The instance was discarded and the transaction rolled back.
    #[error("system failure: {reason}")]
    System {
        /// Diagnostic description of the failure
        reason: String,
    },

    /// No component is registered under the given id.
    #[error("unknown component `{0}`")]
    UnknownComponent(ComponentId),

    /// The component exists but declares no such business method.
    #[error("component `{component}` has no method `{method}`")]
    UnknownMethod {
        /// Target component
        component: ComponentId,
        /// Name that failed to resolve
        method: String,
    },

    /// A deployment-time configuration error, e.g. strict pooling with zero
    /// capacity or a duplicate component id.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The component's pool has been shut down; no further acquisition.
    #[error("component `{0}` is shutting down")]
    ShuttingDown(ComponentId),
}

impl Error {
    /// Whether this failure may succeed on retry once load subsides.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Error::Unavailable { .. })
    }

    /// Whether this is an application-level (contract-declared) failure.
    pub fn is_application(&self) -> bool {
        matches!(self, Error::Application { .. })
    }

    /// Whether this is a system-level failure.
    pub fn is_system(&self) -> bool {
        matches!(self, Error::System { .. })
    }
}

/// Failure raised by an [`InstanceFactory`](crate::traits::InstanceFactory)
/// or by the post-construct chain.
#[derive(Debug, Error)]
pub enum ConstructionError {
    /// A dependency of the instance could not be resolved or injected.
    #[error("dependency resolution failed: {0}")]
    Unresolved(String),

    /// A post-construct callback rejected the instance.
    #[error("post-construct failed: {0}")]
    Callback(#[from] CallbackError),

    /// Any other factory-reported failure.
    #[error("{0}")]
    Other(String),
}

/// Failure reported by a lifecycle callback (interceptor or the instance's
/// own declared callback).
#[derive(Debug, Error)]
#[error("{0}")]
pub struct CallbackError(pub String);

impl CallbackError {
    /// Create a callback error from any displayable message.
    pub fn msg(message: impl Into<String>) -> Self {
        CallbackError(message.into())
    }
}

/// Failure reported by a [`TransactionPolicy`](crate::traits::TransactionPolicy).
#[derive(Debug, Error)]
pub enum TxError {
    /// `before` could not begin, join, or suspend a transaction.
    #[error("transaction begin failed: {0}")]
    Begin(String),

    /// `after` could not commit.
    #[error("transaction commit failed: {0}")]
    Commit(String),

    /// `after` could not roll back.
    #[error("transaction rollback failed: {0}")]
    Rollback(String),
}

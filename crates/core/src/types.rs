//! Core identifier and outcome types
//!
//! This module defines the fundamental types used throughout the container:
//! - [`ComponentId`]: Logical identifier of a deployed component type
//! - [`InstanceId`]: Unique identifier of a pooled worker instance
//! - [`CallerIdentity`]: Security identity attached to an invocation
//! - [`Outcome`]: Tagged result produced at the dispatch boundary

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use uuid::Uuid;

/// Logical identifier of a deployed component type.
///
/// Assigned at deployment time and used as the registry key for the
/// component's pool. Two components may not share an id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ComponentId(String);

impl ComponentId {
    /// Create a component id from any string-like value.
    pub fn new(id: impl Into<String>) -> Self {
        ComponentId(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ComponentId {
    fn from(id: &str) -> Self {
        ComponentId(id.to_string())
    }
}

impl From<String> for ComponentId {
    fn from(id: String) -> Self {
        ComponentId(id)
    }
}

impl std::fmt::Display for ComponentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a single worker instance.
///
/// Stamped at construction time and stable for the instance's whole
/// lifecycle. Used in accounting and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct InstanceId(Uuid);

impl InstanceId {
    /// Create a new random instance id using UUID v4.
    pub fn new() -> Self {
        InstanceId(Uuid::new_v4())
    }
}

impl Default for InstanceId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for InstanceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Security identity of the caller of an invocation.
///
/// An opaque principal name plus the set of role names granted to it.
/// The container never interprets roles itself; it hands the identity and
/// the method's access rule to the configured
/// [`SecurityService`](crate::traits::SecurityService).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallerIdentity {
    principal: String,
    roles: BTreeSet<String>,
}

impl CallerIdentity {
    /// Create an identity with the given principal and granted roles.
    pub fn new<I, S>(principal: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        CallerIdentity {
            principal: principal.into(),
            roles: roles.into_iter().map(Into::into).collect(),
        }
    }

    /// An unauthenticated identity with no roles.
    pub fn anonymous() -> Self {
        CallerIdentity::new("anonymous", Vec::<String>::new())
    }

    /// The identity the container itself runs under for lifecycle work
    /// (instance construction and disposal outside any business call).
    pub fn container() -> Self {
        CallerIdentity::new("<container>", Vec::<String>::new())
    }

    /// The principal name.
    pub fn principal(&self) -> &str {
        &self.principal
    }

    /// The granted role names.
    pub fn roles(&self) -> &BTreeSet<String> {
        &self.roles
    }

    /// Whether this identity holds the given role.
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.contains(role)
    }
}

impl std::fmt::Display for CallerIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.principal)
    }
}

/// Tagged result of dispatching a business method.
///
/// The dispatch boundary always produces an explicit `Outcome`; the
/// container never infers failure classes from unwinding. The class decides
/// both the transactional consequence and the disposition of the worker
/// instance:
///
/// | Outcome | Transaction | Instance |
/// |---------|-------------|----------|
/// | `Success` | commit per policy | released back to the pool |
/// | `ApplicationFailure` | commit or roll back per policy | released back to the pool |
/// | `SystemFailure` | always rolled back | discarded, never pooled again |
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    /// The method returned normally with this result value.
    Success(Value),
    /// An expected, contract-declared failure. The instance is assumed
    /// still structurally sound.
    ApplicationFailure(Value),
    /// An unexpected failure. The instance's internal state can no longer
    /// be trusted.
    SystemFailure(String),
}

impl Outcome {
    /// Successful outcome carrying the method's return value.
    pub fn ok(value: impl Into<Value>) -> Self {
        Outcome::Success(value.into())
    }

    /// Application-level failure carrying a contract-declared payload.
    pub fn app_failure(payload: impl Into<Value>) -> Self {
        Outcome::ApplicationFailure(payload.into())
    }

    /// System-level failure with a diagnostic reason.
    pub fn system_failure(reason: impl Into<String>) -> Self {
        Outcome::SystemFailure(reason.into())
    }

    /// Whether this outcome is a success.
    pub fn is_success(&self) -> bool {
        matches!(self, Outcome::Success(_))
    }

    /// Whether this outcome means the instance must be discarded.
    pub fn is_system_failure(&self) -> bool {
        matches!(self, Outcome::SystemFailure(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn instance_ids_are_unique() {
        let a = InstanceId::new();
        let b = InstanceId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn identity_role_membership() {
        let caller = CallerIdentity::new("mallory", ["auditor", "operator"]);
        assert!(caller.has_role("auditor"));
        assert!(!caller.has_role("admin"));
        assert_eq!(caller.principal(), "mallory");
    }

    #[test]
    fn anonymous_has_no_roles() {
        assert!(CallerIdentity::anonymous().roles().is_empty());
    }

    #[test]
    fn outcome_classification() {
        assert!(Outcome::ok(Value::Null).is_success());
        assert!(!Outcome::app_failure("declined").is_system_failure());
        assert!(Outcome::system_failure("boom").is_system_failure());
    }
}

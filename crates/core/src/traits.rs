//! Collaborator contracts consumed by the container
//!
//! The container orchestrates; everything domain-specific arrives through
//! the traits in this module. Object construction is an opaque
//! [`InstanceFactory`], authorization is a pure [`SecurityService`]
//! predicate, and transaction demarcation is a per-method
//! [`TransactionPolicy`] selected through a [`PolicyProvider`]. None of
//! these are reimplemented here.

use crate::component::{AccessRule, ComponentType, TxAttribute};
use crate::context::CallContext;
use crate::error::{CallbackError, ConstructionError, TxError};
use crate::types::{CallerIdentity, Outcome};
use crate::value::Value;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

/// A stateless business object.
///
/// [`dispatch`](Component::dispatch) is the container's only entry into
/// business logic; it must produce an explicit [`Outcome`] so failure
/// classification never leans on unwinding. A panic that escapes anyway is
/// caught at the dispatch boundary and treated as a system failure.
pub trait Component: Send {
    /// Execute the named business method with the given arguments.
    fn dispatch(&mut self, method: &str, args: Value) -> Outcome;

    /// The instance's own post-construct callback, run after the
    /// interceptor chain — but only when the component type declares one.
    fn post_construct(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// A lifecycle interceptor instance attached to one worker instance.
///
/// Both callbacks default to no-ops so an interceptor may participate in
/// only one phase.
pub trait LifecycleInterceptor: Send {
    /// Runs once after the instance is constructed, in chain order.
    fn post_construct(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }

    /// Runs once before the instance is destroyed, in chain order.
    fn pre_destroy(&mut self) -> Result<(), CallbackError> {
        Ok(())
    }
}

/// What an [`InstanceFactory`] hands back: the business object plus its
/// interceptor instances, keyed by the type names declared in the
/// component descriptor.
pub struct InstanceParts {
    /// The freshly constructed business object.
    pub component: Box<dyn Component>,
    /// Interceptor instances keyed by declared type name.
    pub interceptors: HashMap<String, Box<dyn LifecycleInterceptor>>,
}

impl InstanceParts {
    /// Parts with no interceptors.
    pub fn bare(component: Box<dyn Component>) -> Self {
        InstanceParts { component, interceptors: HashMap::new() }
    }
}

/// Constructs fresh worker instances on pool miss.
///
/// This is the seam to the dependency-injection machinery: given a
/// descriptor, produce a fully injected business object and its
/// interceptors. A failure must not leave a partially injected instance
/// observable outside the call.
pub trait InstanceFactory: Send + Sync {
    /// Build one instance of the described component.
    fn create(&self, component: &ComponentType) -> Result<InstanceParts, ConstructionError>;
}

/// Pure authorization predicate.
pub trait SecurityService: Send + Sync {
    /// Whether `caller` satisfies `rule`. Must have no side effects.
    fn is_authorized(&self, caller: &CallerIdentity, rule: &AccessRule) -> bool;
}

/// Default security service: role-set membership.
///
/// `Unchecked` methods admit everyone; `AnyOf` requires at least one
/// shared role, so a declared-but-empty role set denies all callers.
#[derive(Debug, Default, Clone, Copy)]
pub struct RoleBasedSecurity;

impl SecurityService for RoleBasedSecurity {
    fn is_authorized(&self, caller: &CallerIdentity, rule: &AccessRule) -> bool {
        match rule {
            AccessRule::Unchecked => true,
            AccessRule::AnyOf(roles) => roles.iter().any(|role| caller.has_role(role)),
        }
    }
}

/// Security service that admits every caller. Useful in tests and in
/// deployments that do their own perimeter checks.
#[derive(Debug, Default, Clone, Copy)]
pub struct PermitAll;

impl SecurityService for PermitAll {
    fn is_authorized(&self, _caller: &CallerIdentity, _rule: &AccessRule) -> bool {
        true
    }
}

/// Opaque transactional state handed from [`TransactionPolicy::before`] to
/// [`TransactionPolicy::after`].
///
/// The container never looks inside; it only guarantees the hand-off is
/// symmetric — every successful `before` gets exactly one `after`.
pub struct TxScope(Box<dyn Any + Send>);

impl TxScope {
    /// Wrap policy state.
    pub fn new<T: Any + Send>(state: T) -> Self {
        TxScope(Box::new(state))
    }

    /// Scope for policies that keep no state.
    pub fn empty() -> Self {
        TxScope::new(())
    }

    /// Recover the state put in by `before`.
    pub fn downcast<T: Any + Send>(self) -> Option<Box<T>> {
        self.0.downcast().ok()
    }
}

/// Wraps one business dispatch with transaction demarcation.
///
/// `before` begins, joins, or suspends a transaction per the method's
/// attribute and returns whatever state `after` needs to finish correctly.
/// `after` commits or rolls back based on the dispatch outcome; for a
/// system-failure outcome it must never commit.
pub trait TransactionPolicy: Send + Sync {
    /// Establish the transactional scope for one dispatch.
    fn before(&self, ctx: &CallContext) -> Result<TxScope, TxError>;

    /// Conclude the scope established by `before`.
    fn after(&self, scope: TxScope, outcome: &Outcome) -> Result<(), TxError>;
}

/// Selects the externally supplied policy bound to a method's attribute.
pub trait PolicyProvider: Send + Sync {
    /// The policy to wrap around methods declared with `attribute`.
    fn policy_for(&self, attribute: TxAttribute) -> Arc<dyn TransactionPolicy>;
}

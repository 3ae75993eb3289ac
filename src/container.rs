//! Main container entry point for corral.
//!
//! This module provides the `Corral` struct, the primary entry point for
//! deploying components and invoking their business methods.

use crate::error::{Error, Result};
use corral_core::{
    CallerIdentity, ComponentId, ComponentType, InstanceFactory, PolicyProvider, SecurityService,
    Value,
};
use corral_engine::{Dispatcher, PassthroughPolicies, PoolStats};
use std::sync::Arc;

/// The corral container.
///
/// Holds a pool of worker instances per registered component type and
/// pushes every invocation through the full pipeline: authorization,
/// pooled acquisition, transaction demarcation, dispatch, and
/// outcome-driven instance disposition.
///
/// # Example
///
/// ```ignore
/// use corral::prelude::*;
///
/// let container = Corral::new();
/// container.register(
///     ComponentType::builder("greeter")
///         .method(MethodDescriptor::new("hello"))
///         .build(),
///     Arc::new(GreeterFactory),
/// )?;
///
/// let result = container.invoke("greeter", "hello", Value::Null, CallerIdentity::anonymous())?;
///
/// container.shutdown();
/// ```
#[derive(Clone)]
pub struct Corral {
    inner: Arc<Dispatcher>,
}

impl Corral {
    /// Container with default services: role-based security and
    /// passthrough (no-op) transaction policies.
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Create a builder for container configuration.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let container = Corral::builder()
    ///     .security(Arc::new(PermitAll))
    ///     .transaction_policies(Arc::new(MyPolicies::new(tx_manager)))
    ///     .build();
    /// ```
    pub fn builder() -> CorralBuilder {
        CorralBuilder::new()
    }

    /// Deploy a component type with the factory that constructs its
    /// instances. Creates the component's pool.
    pub fn register(
        &self,
        component: ComponentType,
        factory: Arc<dyn InstanceFactory>,
    ) -> Result<()> {
        self.inner.register(component, factory).map_err(Error::from)
    }

    /// Undeploy a component and drain its pool.
    pub fn unregister(&self, component: &str) -> Result<()> {
        self.inner
            .unregister(&ComponentId::new(component))
            .map_err(Error::from)
    }

    /// Invoke a business method on a pooled instance of `component`.
    pub fn invoke(
        &self,
        component: &str,
        method: &str,
        args: Value,
        caller: CallerIdentity,
    ) -> Result<Value> {
        self.inner
            .invoke(&ComponentId::new(component), method, args, caller)
            .map_err(Error::from)
    }

    /// Occupancy counters for one component's pool.
    pub fn stats(&self, component: &str) -> Result<PoolStats> {
        self.inner
            .stats(&ComponentId::new(component))
            .map_err(Error::from)
    }

    /// Drain every registered component. The container should not be used
    /// afterwards.
    pub fn shutdown(&self) {
        self.inner.shutdown();
    }
}

impl Default for Corral {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for container configuration.
pub struct CorralBuilder {
    security: Option<Arc<dyn SecurityService>>,
    policies: Option<Arc<dyn PolicyProvider>>,
}

impl CorralBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        CorralBuilder { security: None, policies: None }
    }

    /// Set the authorization service consulted before every invocation.
    pub fn security(mut self, security: Arc<dyn SecurityService>) -> Self {
        self.security = Some(security);
        self
    }

    /// Set the provider of per-method transaction policies.
    pub fn transaction_policies(mut self, policies: Arc<dyn PolicyProvider>) -> Self {
        self.policies = Some(policies);
        self
    }

    /// Build the container.
    pub fn build(self) -> Corral {
        let security = self
            .security
            .unwrap_or_else(|| Arc::new(corral_core::RoleBasedSecurity));
        let policies = self
            .policies
            .unwrap_or_else(|| Arc::new(PassthroughPolicies::new()));
        Corral {
            inner: Arc::new(Dispatcher::with_services(security, policies)),
        }
    }
}

impl Default for CorralBuilder {
    fn default() -> Self {
        Self::new()
    }
}

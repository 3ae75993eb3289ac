//! The invocation dispatcher
//!
//! [`Dispatcher`] is the orchestrator that turns an inbound call into a
//! pooled-instance dispatch:
//!
//! ```text
//! invoke(component, method, args, caller)
//!   ├─ resolve deployment and method descriptor
//!   ├─ authorize                       (before any instance is touched)
//!   ├─ enter CallContext               (guard-restored on every path)
//!   ├─ pool.acquire                    (may block under strict pooling)
//!   ├─ policy.before                   (begin/join/suspend transaction)
//!   ├─ dispatch  → Outcome             (panics caught at the boundary)
//!   ├─ policy.after                    (commit or roll back per outcome)
//!   └─ pool.release | pool.discard     (per outcome class)
//! ```
//!
//! Ordering rules the rest of the system relies on:
//! - authorization precedes acquisition, so rejected callers never consume
//!   pool capacity;
//! - every successful `before` is matched by exactly one `after`, on every
//!   path;
//! - a `before` failure skips `after` and discards the instance;
//! - instance disposition depends only on the dispatch outcome, never on
//!   how the transaction completion went.

use crate::policy::PassthroughPolicies;
use corral_core::{
    CallContext, CallerIdentity, ComponentId, ComponentType, Error, InstanceFactory, Outcome,
    PolicyProvider, Result, RoleBasedSecurity, SecurityService, Value,
};
use corral_pool::{InstancePool, PoolStats, WorkerInstance};
use dashmap::DashMap;
use std::sync::Arc;

/// One registered component: its descriptor plus its pool.
struct Deployment {
    component: Arc<ComponentType>,
    pool: InstancePool,
}

/// Routes invocations to pooled worker instances.
///
/// Shared-state layout: the registry is a concurrent map keyed by
/// component id; each entry's pool does its own locking. `invoke` holds no
/// registry lock while dispatching, so deployment and invocation traffic
/// never serialize against each other.
pub struct Dispatcher {
    registry: DashMap<ComponentId, Arc<Deployment>>,
    security: Arc<dyn SecurityService>,
    policies: Arc<dyn PolicyProvider>,
}

impl Dispatcher {
    /// Dispatcher with role-based security and passthrough transaction
    /// policies.
    pub fn new() -> Self {
        Self::with_services(
            Arc::new(RoleBasedSecurity),
            Arc::new(PassthroughPolicies::new()),
        )
    }

    /// Dispatcher with explicit collaborator services.
    pub fn with_services(
        security: Arc<dyn SecurityService>,
        policies: Arc<dyn PolicyProvider>,
    ) -> Self {
        Dispatcher {
            registry: DashMap::new(),
            security,
            policies,
        }
    }

    /// Deploy a component type: validate its pool settings, create the
    /// pool, and make the component invocable.
    pub fn register(
        &self,
        component: ComponentType,
        factory: Arc<dyn InstanceFactory>,
    ) -> Result<()> {
        let component = Arc::new(component);
        let pool = InstancePool::new(component.clone(), factory)?;
        let id = component.id().clone();
        let deployment = Arc::new(Deployment { component, pool });

        match self.registry.entry(id.clone()) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(Error::InvalidConfig(format!(
                "component `{id}` is already registered"
            ))),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(deployment);
                tracing::info!(component = %id, "component registered");
                Ok(())
            }
        }
    }

    /// Undeploy a component: remove it from the registry and drain its
    /// pool. Instances still checked out are destroyed as they return.
    pub fn unregister(&self, id: &ComponentId) -> Result<()> {
        let (_, deployment) = self
            .registry
            .remove(id)
            .ok_or_else(|| Error::UnknownComponent(id.clone()))?;
        deployment.pool.shutdown();
        tracing::info!(component = %id, "component unregistered");
        Ok(())
    }

    /// Drain every registered component.
    pub fn shutdown(&self) {
        let ids: Vec<ComponentId> = self.registry.iter().map(|e| e.key().clone()).collect();
        for id in ids {
            if let Some((_, deployment)) = self.registry.remove(&id) {
                deployment.pool.shutdown();
            }
        }
    }

    /// Occupancy counters for one component's pool.
    pub fn stats(&self, id: &ComponentId) -> Result<PoolStats> {
        let deployment = self
            .registry
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::UnknownComponent(id.clone()))?;
        Ok(deployment.pool.stats())
    }

    /// Invoke a business method on a pooled instance of `id`.
    pub fn invoke(
        &self,
        id: &ComponentId,
        method: &str,
        args: Value,
        caller: CallerIdentity,
    ) -> Result<Value> {
        let deployment = self
            .registry
            .get(id)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| Error::UnknownComponent(id.clone()))?;

        let descriptor = deployment
            .component
            .method(method)
            .ok_or_else(|| Error::UnknownMethod {
                component: id.clone(),
                method: method.to_string(),
            })?
            .clone();

        // Authorization comes first: a rejected caller must not consume
        // pool capacity or transaction work.
        if !self.security.is_authorized(&caller, descriptor.access()) {
            return Err(Error::NotAuthorized {
                component: id.clone(),
                method: method.to_string(),
                caller: caller.principal().to_string(),
            });
        }

        let ctx = CallContext::business(deployment.component.clone(), caller, method);
        let _scope = ctx.clone().enter();

        // Acquisition failures propagate as-is: no transaction has started.
        let mut instance = deployment
            .pool
            .acquire(deployment.component.pool().timeout)?;

        let policy = self.policies.policy_for(descriptor.tx_attribute());
        let tx = match policy.before(&ctx) {
            Ok(tx) => tx,
            Err(e) => {
                // No matching `after` for a failed `before`; the instance
                // never ran and its transactional state is unknown.
                tracing::warn!(component = %id, method, error = %e, "transaction begin failed");
                deployment.pool.discard(instance);
                return Err(Error::System {
                    reason: format!("transaction begin failed: {e}"),
                });
            }
        };

        let outcome = dispatch_guarded(&mut instance, method, args);
        let completion = policy.after(tx, &outcome);

        // Disposition depends only on the outcome class.
        match &outcome {
            Outcome::SystemFailure(reason) => {
                tracing::warn!(component = %id, method, reason = %reason, "system failure; discarding instance");
                deployment.pool.discard(instance);
            }
            _ => deployment.pool.release(instance),
        }

        match outcome {
            Outcome::Success(value) => match completion {
                Ok(()) => Ok(value),
                Err(e) => Err(Error::System {
                    reason: format!("transaction completion failed: {e}"),
                }),
            },
            Outcome::ApplicationFailure(payload) => {
                if let Err(e) = completion {
                    // The declared failure must reach the caller; the
                    // completion failure is recorded, not propagated.
                    tracing::error!(component = %id, method, error = %e, "transaction completion failed after application failure");
                }
                Err(Error::Application {
                    component: id.clone(),
                    payload,
                })
            }
            Outcome::SystemFailure(reason) => {
                if let Err(e) = completion {
                    tracing::error!(component = %id, method, error = %e, "rollback failed after system failure");
                }
                Err(Error::System { reason })
            }
        }
    }
}

impl Default for Dispatcher {
    fn default() -> Self {
        Self::new()
    }
}

/// Run the business method and classify everything that comes out of it,
/// including panics crossing the dispatch boundary.
fn dispatch_guarded(instance: &mut WorkerInstance, method: &str, args: Value) -> Outcome {
    let call = std::panic::AssertUnwindSafe(|| instance.dispatch(method, args));
    match std::panic::catch_unwind(call) {
        Ok(outcome) => outcome,
        Err(payload) => Outcome::SystemFailure(panic_reason(&payload)),
    }
}

fn panic_reason(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        format!("panic in business method: {s}")
    } else if let Some(s) = payload.downcast_ref::<String>() {
        format!("panic in business method: {s}")
    } else {
        "panic in business method".to_string()
    }
}

//! Ordered lifecycle-callback chains
//!
//! The [`LifecycleInvoker`] runs a component's interceptor chain around an
//! instance's construction and destruction. The two phases have opposite
//! failure rules:
//!
//! - **post-construct** is all-or-nothing. The first failing callback
//!   aborts construction; the partially built instance is torn down and
//!   never exposed to a caller.
//! - **pre-destroy** is best-effort. A failing callback is logged and the
//!   remaining interceptors still run, so one broken interceptor cannot
//!   block teardown of the others — and a teardown failure never masks the
//!   failure that triggered the disposal.

use crate::instance::WorkerInstance;
use corral_core::{CallContext, CallbackError, ComponentType, Phase};
use std::sync::Arc;

/// Runs a component's lifecycle chains against worker instances.
#[derive(Clone)]
pub struct LifecycleInvoker {
    component: Arc<ComponentType>,
}

impl LifecycleInvoker {
    /// Create an invoker for one component's declared chain.
    pub fn new(component: Arc<ComponentType>) -> Self {
        LifecycleInvoker { component }
    }

    /// Run the post-construct chain: every interceptor in declaration
    /// order, then the instance's own callback if the component declares
    /// one. The first error aborts the chain.
    pub fn post_construct(&self, instance: &mut WorkerInstance) -> Result<(), CallbackError> {
        let _ctx = CallContext::lifecycle(self.component.clone(), Phase::Create).enter();

        for type_name in self.component.interceptors() {
            let interceptor = instance.interceptor_mut(type_name).ok_or_else(|| {
                CallbackError::msg(format!("no interceptor instance for `{type_name}`"))
            })?;
            interceptor.post_construct().map_err(|e| {
                CallbackError::msg(format!("interceptor `{type_name}`: {e}"))
            })?;
        }

        if self.component.declares_post_construct() {
            instance.component_mut().post_construct()?;
        }
        Ok(())
    }

    /// Run the pre-destroy chain, best-effort. Failures are logged and
    /// swallowed; every interceptor gets its turn.
    pub fn pre_destroy(&self, instance: &mut WorkerInstance) {
        let _ctx = CallContext::lifecycle(self.component.clone(), Phase::Remove).enter();

        for type_name in self.component.interceptors() {
            let Some(interceptor) = instance.interceptor_mut(type_name) else {
                continue;
            };
            if let Err(e) = interceptor.pre_destroy() {
                tracing::error!(
                    component = %self.component.id(),
                    instance = %instance.id(),
                    interceptor = %type_name,
                    error = %e,
                    "pre-destroy callback failed; continuing teardown"
                );
            }
        }
    }
}

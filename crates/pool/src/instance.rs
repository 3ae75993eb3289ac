//! Pooled worker instances
//!
//! A [`WorkerInstance`] bundles one business object with its interceptor
//! instances and tracks where the instance sits in its lifecycle. The pool
//! is the only code that moves instances between states; everyone else
//! holds an instance exclusively between `acquire` and `release`/`discard`
//! and only dispatches through it.

use corral_core::{Component, InstanceId, InstanceParts, LifecycleInterceptor, Outcome, Value};
use std::collections::HashMap;

/// Lifecycle state of a worker instance.
///
/// Transitions: `Created → {Ready, Acquired}`, `Ready → Acquired`,
/// `Acquired → {Ready, Destroyed}`. A freshly built instance goes straight
/// to `Acquired` when construction happened to satisfy a waiting caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceState {
    /// Constructed, post-construct chain complete, not yet visible.
    Created,
    /// Idle in the pool.
    Ready,
    /// Checked out by exactly one caller.
    Acquired,
    /// Pre-destroy chain has run; the instance is gone.
    Destroyed,
}

/// One pooled worker: a business object plus its interceptor instances.
pub struct WorkerInstance {
    id: InstanceId,
    component: Box<dyn Component>,
    interceptors: HashMap<String, Box<dyn LifecycleInterceptor>>,
    state: InstanceState,
}

impl WorkerInstance {
    /// Wrap freshly constructed parts. The instance starts in `Created`.
    pub fn new(parts: InstanceParts) -> Self {
        WorkerInstance {
            id: InstanceId::new(),
            component: parts.component,
            interceptors: parts.interceptors,
            state: InstanceState::Created,
        }
    }

    /// The instance's unique id.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// The current lifecycle state.
    pub fn state(&self) -> InstanceState {
        self.state
    }

    /// Dispatch a business method on the wrapped object.
    pub fn dispatch(&mut self, method: &str, args: Value) -> Outcome {
        debug_assert_eq!(self.state, InstanceState::Acquired, "dispatch on unowned instance");
        self.component.dispatch(method, args)
    }

    /// The wrapped business object, for its own lifecycle callback.
    pub(crate) fn component_mut(&mut self) -> &mut dyn Component {
        self.component.as_mut()
    }

    /// The interceptor instance registered under `type_name`, if any.
    pub(crate) fn interceptor_mut(
        &mut self,
        type_name: &str,
    ) -> Option<&mut Box<dyn LifecycleInterceptor>> {
        self.interceptors.get_mut(type_name)
    }

    pub(crate) fn mark_ready(&mut self) {
        debug_assert!(
            matches!(self.state, InstanceState::Created | InstanceState::Acquired),
            "invalid transition to Ready from {:?}",
            self.state
        );
        self.state = InstanceState::Ready;
    }

    pub(crate) fn mark_acquired(&mut self) {
        debug_assert!(
            matches!(self.state, InstanceState::Created | InstanceState::Ready),
            "invalid transition to Acquired from {:?}",
            self.state
        );
        self.state = InstanceState::Acquired;
    }

    pub(crate) fn mark_destroyed(&mut self) {
        self.state = InstanceState::Destroyed;
    }
}

impl std::fmt::Debug for WorkerInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerInstance")
            .field("id", &self.id)
            .field("state", &self.state)
            .field("interceptors", &self.interceptors.keys().collect::<Vec<_>>())
            .finish()
    }
}

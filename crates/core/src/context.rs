//! Per-invocation call context
//!
//! Every piece of container work — a business dispatch, instance
//! construction, instance disposal — runs under a [`CallContext`] that
//! records which component is active, on whose behalf, and in which
//! lifecycle phase. Contexts form a per-thread stack: entering one pushes,
//! and the returned [`ContextGuard`] pops on drop, so the previous context
//! is restored on every exit path, unwinding included.
//!
//! The stack is thread-local. No two threads ever observe each other's
//! contexts, so no locking is involved.

use crate::component::ComponentType;
use crate::types::CallerIdentity;
use std::cell::RefCell;
use std::marker::PhantomData;
use std::sync::Arc;

thread_local! {
    static STACK: RefCell<Vec<CallContext>> = const { RefCell::new(Vec::new()) };
}

/// The lifecycle phase a context is executing in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Wiring an instance's dependencies during construction.
    SetContext,
    /// Running the post-construct chain.
    Create,
    /// Dispatching a business method.
    Business,
    /// Running the pre-destroy chain.
    Remove,
}

/// Call-scoped record of the active component, caller, and phase.
#[derive(Debug, Clone)]
pub struct CallContext {
    component: Arc<ComponentType>,
    caller: CallerIdentity,
    phase: Phase,
    method: Option<String>,
}

impl CallContext {
    /// Context for a business-method dispatch.
    pub fn business(
        component: Arc<ComponentType>,
        caller: CallerIdentity,
        method: impl Into<String>,
    ) -> Self {
        CallContext {
            component,
            caller,
            phase: Phase::Business,
            method: Some(method.into()),
        }
    }

    /// Context for container-internal lifecycle work (construction and
    /// disposal), running under the container's own identity.
    pub fn lifecycle(component: Arc<ComponentType>, phase: Phase) -> Self {
        CallContext {
            component,
            caller: CallerIdentity::container(),
            phase,
            method: None,
        }
    }

    /// The active component descriptor.
    pub fn component(&self) -> &Arc<ComponentType> {
        &self.component
    }

    /// The identity this work runs on behalf of.
    pub fn caller(&self) -> &CallerIdentity {
        &self.caller
    }

    /// The current lifecycle phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The business method being executed, if any.
    pub fn method(&self) -> Option<&str> {
        self.method.as_deref()
    }

    /// Push this context onto the calling thread's stack.
    ///
    /// The previous context (if any) becomes current again when the
    /// returned guard drops.
    pub fn enter(self) -> ContextGuard {
        STACK.with(|stack| stack.borrow_mut().push(self));
        ContextGuard { _not_send: PhantomData }
    }

    /// A clone of the calling thread's current context, if one is active.
    pub fn current() -> Option<CallContext> {
        STACK.with(|stack| stack.borrow().last().cloned())
    }

    /// Depth of the calling thread's context stack.
    pub fn depth() -> usize {
        STACK.with(|stack| stack.borrow().len())
    }
}

/// Pops the context pushed by [`CallContext::enter`] when dropped.
///
/// Not `Send`: the pop must happen on the thread that pushed.
#[must_use = "dropping the guard immediately would pop the context right away"]
pub struct ContextGuard {
    _not_send: PhantomData<*const ()>,
}

impl Drop for ContextGuard {
    fn drop(&mut self) {
        STACK.with(|stack| {
            let popped = stack.borrow_mut().pop();
            debug_assert!(popped.is_some(), "context stack underflow");
        });
    }
}

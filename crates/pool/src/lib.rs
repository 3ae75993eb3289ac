//! Worker-instance pooling for the corral container
//!
//! This crate owns the bounded-resource half of the invocation pipeline:
//! - [`WorkerInstance`]: one business object plus its interceptor
//!   instances, moving through `Created → Ready → Acquired → Destroyed`
//! - [`LifecycleInvoker`]: ordered post-construct / pre-destroy chains
//! - [`InstancePool`]: the per-component bounded pool with strict
//!   (blocking, timeout-bounded) and elastic modes
//!
//! The pool is the only shared mutable structure in the container core;
//! everything it hands out is exclusively owned until returned.

#![warn(missing_docs)]
#![warn(clippy::all)]

mod instance;
mod lifecycle;
mod pool;

pub use instance::{InstanceState, WorkerInstance};
pub use lifecycle::LifecycleInvoker;
pub use pool::{InstancePool, PoolStats};

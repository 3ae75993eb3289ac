//! Invocation engine for the corral container
//!
//! Orchestrates the full pipeline over the lower crates: authorization,
//! pooled-instance acquisition, transaction-policy demarcation, guarded
//! dispatch, outcome classification, and instance disposition.
//!
//! - [`Dispatcher`]: the container orchestrator (`register` / `unregister`
//!   / `invoke` / `shutdown`)
//! - [`PassthroughPolicies`]: default policy wiring for deployments with
//!   no transaction manager

#![warn(missing_docs)]
#![warn(clippy::all)]

mod dispatcher;
mod policy;

pub use dispatcher::Dispatcher;
pub use policy::{PassthroughPolicies, PassthroughPolicy};

// The pool's occupancy snapshot is part of this crate's public surface.
pub use corral_pool::PoolStats;

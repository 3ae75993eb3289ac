//! # Corral
//!
//! A managed-instance pool and transactional invocation pipeline for
//! stateless components.
//!
//! Corral turns an inbound method call into a pooled worker-object
//! acquisition, a security check, a transaction-scoped dispatch with
//! lifecycle callbacks, and an outcome-driven instance disposition —
//! correct under concurrent multi-threaded access, with no double-checkout
//! and no instance leakage.
//!
//! ## Quick Start
//!
//! ```ignore
//! use corral::prelude::*;
//!
//! // Build a container
//! let container = Corral::new();
//!
//! // Deploy a component with a bounded, strictly pooled instance set
//! container.register(
//!     ComponentType::builder("ledger")
//!         .method(MethodDescriptor::new("post").tx(TxAttribute::RequiresNew).allow_roles(["teller"]))
//!         .method(MethodDescriptor::new("balance"))
//!         .pool(PoolSettings { capacity: 8, strict: true, timeout: Duration::from_millis(250) })
//!         .build(),
//!     Arc::new(LedgerFactory::new(datasource)),
//! )?;
//!
//! // Invoke: authorize → acquire → begin → dispatch → commit → release
//! let caller = CallerIdentity::new("t-042", ["teller"]);
//! let receipt = container.invoke("ledger", "post", args, caller)?;
//!
//! // Drain the pools on the way out
//! container.shutdown();
//! ```
//!
//! ## Outcome classes
//!
//! Business methods return an explicit [`Outcome`]; the container never
//! infers failure classes from unwinding:
//!
//! - `Success` — commit per the method's policy, instance released
//! - `ApplicationFailure` — declared failure, instance released, commit or
//!   rollback per policy
//! - `SystemFailure` — instance discarded, transaction always rolled back
//!
//! A panic escaping a business method is caught at the dispatch boundary
//! and handled as a `SystemFailure`.

#![warn(missing_docs)]

mod container;
mod error;

pub mod prelude;

// Re-export main entry points
pub use container::{Corral, CorralBuilder};
pub use error::{Error, Result};

// Re-export the descriptor, payload, and collaborator surface
pub use corral_core::{
    AccessRule, CallContext, CallbackError, CallerIdentity, Component, ComponentId, ComponentType,
    ComponentTypeBuilder, ConstructionError, InstanceFactory, InstanceParts, LifecycleInterceptor,
    MethodDescriptor, Outcome, PermitAll, Phase, PolicyProvider, PoolSettings, RoleBasedSecurity,
    SecurityService, TransactionPolicy, TxAttribute, TxError, TxScope, Value,
};

// Re-export pool observability and default policy wiring
pub use corral_engine::{PassthroughPolicies, PassthroughPolicy, PoolStats};

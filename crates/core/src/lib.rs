//! Core types and collaborator contracts for the corral container
//!
//! This crate holds everything the pooling and dispatch layers share:
//! - [`ComponentType`]: immutable deployment descriptors (method table,
//!   transaction attributes, access rules, interceptor chain, pool sizing)
//! - [`CallContext`]: the per-thread, guard-restored invocation context
//! - [`Outcome`]: the tagged dispatch result that drives transaction and
//!   instance disposition
//! - [`Error`]: the container failure taxonomy
//! - Collaborator traits: [`Component`], [`InstanceFactory`],
//!   [`SecurityService`], [`TransactionPolicy`], [`PolicyProvider`]
//!
//! No orchestration lives here; see `corral-pool` and `corral-engine`.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod component;
pub mod context;
pub mod error;
pub mod traits;
pub mod types;
pub mod value;

pub use component::{
    AccessRule, ComponentType, ComponentTypeBuilder, MethodDescriptor, PoolSettings, TxAttribute,
};
pub use context::{CallContext, ContextGuard, Phase};
pub use error::{CallbackError, ConstructionError, Error, Result, TxError};
pub use traits::{
    Component, InstanceFactory, InstanceParts, LifecycleInterceptor, PermitAll, PolicyProvider,
    RoleBasedSecurity, SecurityService, TransactionPolicy, TxScope,
};
pub use types::{CallerIdentity, ComponentId, InstanceId, Outcome};
pub use value::Value;

//! Convenience re-exports for the common corral surface.
//!
//! ```ignore
//! use corral::prelude::*;
//! ```

pub use crate::container::{Corral, CorralBuilder};
pub use crate::error::{Error, Result};

pub use corral_core::{
    AccessRule, CallerIdentity, Component, ComponentType, InstanceFactory, InstanceParts,
    LifecycleInterceptor, MethodDescriptor, Outcome, PoolSettings, TxAttribute, Value,
};

pub use corral_engine::PoolStats;

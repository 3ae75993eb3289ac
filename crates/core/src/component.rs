//! Deployment-time component descriptors
//!
//! A [`ComponentType`] is the immutable description of one deployable
//! stateless component: its business-method table (with per-method
//! transaction attribute and access rule), the ordered lifecycle-interceptor
//! chain, and the sizing of its instance pool. Descriptors are created at
//! registration time, shared via `Arc`, and read concurrently without
//! locking for the lifetime of the deployment.

use crate::error::{Error, Result};
use crate::types::ComponentId;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::time::Duration;

/// Per-method transaction attribute.
///
/// The container never interprets attributes itself; it routes each one to
/// the configured policy provider, which supplies the begin/commit/rollback
/// behavior. The attribute set mirrors the classic container-managed
/// transaction demarcation modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TxAttribute {
    /// Join the caller's transaction, or start one if none is active.
    Required,
    /// Always start a fresh transaction, suspending any active one.
    RequiresNew,
    /// Join the caller's transaction if present, otherwise run without one.
    Supports,
    /// Run without a transaction, suspending any active one.
    NotSupported,
    /// Require an already-active transaction; fail otherwise.
    Mandatory,
    /// Require that no transaction is active; fail otherwise.
    Never,
}

/// Who may invoke a method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccessRule {
    /// No roles declared: the method is open to every caller.
    Unchecked,
    /// The caller must hold at least one of these roles. An empty set
    /// denies everyone.
    AnyOf(BTreeSet<String>),
}

impl AccessRule {
    /// Build an `AnyOf` rule from role names.
    pub fn any_of<I, S>(roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        AccessRule::AnyOf(roles.into_iter().map(Into::into).collect())
    }
}

/// One entry in a component's business-method table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    name: String,
    tx: TxAttribute,
    access: AccessRule,
}

impl MethodDescriptor {
    /// Create a descriptor with the default attribute (`Required`) and an
    /// unchecked access rule.
    pub fn new(name: impl Into<String>) -> Self {
        MethodDescriptor {
            name: name.into(),
            tx: TxAttribute::Required,
            access: AccessRule::Unchecked,
        }
    }

    /// Set the transaction attribute.
    pub fn tx(mut self, tx: TxAttribute) -> Self {
        self.tx = tx;
        self
    }

    /// Restrict the method to callers holding at least one of `roles`.
    pub fn allow_roles<I, S>(mut self, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.access = AccessRule::any_of(roles);
        self
    }

    /// The method name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The declared transaction attribute.
    pub fn tx_attribute(&self) -> TxAttribute {
        self.tx
    }

    /// The declared access rule.
    pub fn access(&self) -> &AccessRule {
        &self.access
    }
}

/// Sizing and admission-control parameters for a component's pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PoolSettings {
    /// Maximum number of instances (idle plus checked out) the pool will
    /// hold under strict pooling, and the idle retention bound otherwise.
    pub capacity: usize,
    /// Strict pooling blocks acquisition at capacity instead of growing.
    pub strict: bool,
    /// How long a strict-mode acquire may block before failing.
    pub timeout: Duration,
}

impl Default for PoolSettings {
    fn default() -> Self {
        PoolSettings {
            capacity: 10,
            strict: true,
            timeout: Duration::from_secs(30),
        }
    }
}

impl PoolSettings {
    /// Validate the settings at registration time.
    ///
    /// Strict pooling with zero capacity can never make progress: every
    /// acquire would block forever. It is rejected here rather than
    /// surfacing as a hang in production.
    pub fn validate(&self) -> Result<()> {
        if self.strict && self.capacity == 0 {
            return Err(Error::InvalidConfig(
                "strict pooling requires a capacity of at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// Immutable descriptor of one deployable component type.
///
/// Built once via [`ComponentType::builder`], then shared read-only. The
/// interceptor list is ordered: post-construct and pre-destroy chains run
/// in declaration order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentType {
    id: ComponentId,
    methods: HashMap<String, MethodDescriptor>,
    interceptors: Vec<String>,
    declares_post_construct: bool,
    pool: PoolSettings,
}

impl ComponentType {
    /// Start building a descriptor for the given component id.
    pub fn builder(id: impl Into<ComponentId>) -> ComponentTypeBuilder {
        ComponentTypeBuilder {
            id: id.into(),
            methods: HashMap::new(),
            interceptors: Vec::new(),
            declares_post_construct: false,
            pool: PoolSettings::default(),
        }
    }

    /// The component's id.
    pub fn id(&self) -> &ComponentId {
        &self.id
    }

    /// Look up a business method by name.
    pub fn method(&self, name: &str) -> Option<&MethodDescriptor> {
        self.methods.get(name)
    }

    /// The ordered lifecycle-interceptor type names.
    pub fn interceptors(&self) -> &[String] {
        &self.interceptors
    }

    /// Whether the target instance declares its own post-construct
    /// callback, to be run after the interceptor chain.
    pub fn declares_post_construct(&self) -> bool {
        self.declares_post_construct
    }

    /// The pool sizing parameters.
    pub fn pool(&self) -> &PoolSettings {
        &self.pool
    }
}

/// Builder for [`ComponentType`].
#[derive(Debug)]
pub struct ComponentTypeBuilder {
    id: ComponentId,
    methods: HashMap<String, MethodDescriptor>,
    interceptors: Vec<String>,
    declares_post_construct: bool,
    pool: PoolSettings,
}

impl ComponentTypeBuilder {
    /// Add a business method. A later descriptor with the same name
    /// replaces an earlier one.
    pub fn method(mut self, descriptor: MethodDescriptor) -> Self {
        self.methods.insert(descriptor.name.clone(), descriptor);
        self
    }

    /// Append an interceptor type name to the lifecycle chain.
    pub fn interceptor(mut self, type_name: impl Into<String>) -> Self {
        self.interceptors.push(type_name.into());
        self
    }

    /// Declare that instances carry their own post-construct callback.
    pub fn with_post_construct(mut self) -> Self {
        self.declares_post_construct = true;
        self
    }

    /// Set the pool sizing parameters.
    pub fn pool(mut self, settings: PoolSettings) -> Self {
        self.pool = settings;
        self
    }

    /// Finish the descriptor. Pool settings are validated at registration,
    /// not here, so descriptors can be built freely in configuration code.
    pub fn build(self) -> ComponentType {
        ComponentType {
            id: self.id,
            methods: self.methods,
            interceptors: self.interceptors,
            declares_post_construct: self.declares_post_construct,
            pool: self.pool,
        }
    }
}

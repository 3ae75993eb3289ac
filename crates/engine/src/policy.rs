//! Transaction-policy plumbing
//!
//! The engine never implements transaction demarcation itself; it selects
//! an externally supplied [`TransactionPolicy`] per method attribute and
//! calls its `before`/`after` hooks symmetrically around the dispatch.
//! What lives here is the default wiring for deployments that run without
//! a transaction manager at all.

use corral_core::{
    CallContext, Outcome, PolicyProvider, TransactionPolicy, TxAttribute, TxError, TxScope,
};
use std::sync::Arc;

/// Policy that performs no transaction work.
///
/// `before` establishes an empty scope and `after` accepts any outcome.
/// This is the demarcation equivalent of bean-managed transactions: the
/// container stays out of the way.
#[derive(Debug, Default)]
pub struct PassthroughPolicy;

impl TransactionPolicy for PassthroughPolicy {
    fn before(&self, _ctx: &CallContext) -> Result<TxScope, TxError> {
        Ok(TxScope::empty())
    }

    fn after(&self, _scope: TxScope, _outcome: &Outcome) -> Result<(), TxError> {
        Ok(())
    }
}

/// Provider that answers every attribute with [`PassthroughPolicy`].
///
/// The default when no transaction manager is installed.
#[derive(Debug)]
pub struct PassthroughPolicies {
    policy: Arc<PassthroughPolicy>,
}

impl PassthroughPolicies {
    /// Create the provider.
    pub fn new() -> Self {
        PassthroughPolicies { policy: Arc::new(PassthroughPolicy) }
    }
}

impl Default for PassthroughPolicies {
    fn default() -> Self {
        Self::new()
    }
}

impl PolicyProvider for PassthroughPolicies {
    fn policy_for(&self, _attribute: TxAttribute) -> Arc<dyn TransactionPolicy> {
        self.policy.clone()
    }
}

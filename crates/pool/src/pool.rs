//! Bounded instance pool with strict (blocking) and elastic modes
//!
//! One [`InstancePool`] exists per deployed component type. Idle instances
//! are kept LIFO so the most recently used instance is handed out first,
//! which keeps caches warm and lets cold instances age out at the bottom.
//!
//! # Modes
//!
//! - **strict**: `idle + outstanding` never exceeds capacity. An acquire
//!   against a full pool blocks on a condition variable until a release,
//!   bounded by the acquire timeout.
//! - **elastic**: a pool miss always constructs. Capacity only bounds how
//!   many idle instances are retained; over-capacity releases are destroyed
//!   rather than pooled, which bounds memory under bursty load.
//!
//! # Accounting
//!
//! One mutex guards the idle list and counters. The invariant
//! `idle + outstanding == created − destroyed` holds at every point where
//! the lock is not held; a slot being constructed counts as both created
//! and outstanding, and both are rolled back if construction fails.
//! Construction itself runs outside the lock so a slow factory never
//! blocks releases.

use crate::instance::WorkerInstance;
use crate::lifecycle::LifecycleInvoker;
use corral_core::{
    CallContext, ComponentType, ConstructionError, Error, InstanceFactory, Phase, PoolSettings,
    Result,
};
use parking_lot::{Condvar, Mutex, MutexGuard};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Occupancy counters for one pool, as of one observation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PoolStats {
    /// Instances idle in the pool.
    pub idle: usize,
    /// Instances checked out (or mid-construction).
    pub outstanding: usize,
    /// Instances ever successfully constructed.
    pub created: u64,
    /// Instances destroyed (discarded, over-capacity, or drained).
    pub destroyed: u64,
    /// Configured capacity.
    pub capacity: usize,
}

struct Shared {
    idle: Vec<WorkerInstance>,
    outstanding: usize,
    created: u64,
    destroyed: u64,
    closed: bool,
}

/// Bounded per-component pool of worker instances.
pub struct InstancePool {
    component: Arc<ComponentType>,
    factory: Arc<dyn InstanceFactory>,
    lifecycle: LifecycleInvoker,
    shared: Mutex<Shared>,
    available: Condvar,
}

impl InstancePool {
    /// Create a pool for one component type.
    ///
    /// Fails fast on unusable settings (strict pooling with zero capacity).
    pub fn new(component: Arc<ComponentType>, factory: Arc<dyn InstanceFactory>) -> Result<Self> {
        component.pool().validate()?;
        Ok(InstancePool {
            lifecycle: LifecycleInvoker::new(component.clone()),
            component,
            factory,
            shared: Mutex::new(Shared {
                idle: Vec::new(),
                outstanding: 0,
                created: 0,
                destroyed: 0,
                closed: false,
            }),
            available: Condvar::new(),
        })
    }

    fn settings(&self) -> &PoolSettings {
        self.component.pool()
    }

    /// Check an instance out of the pool.
    ///
    /// Pops the most recently released idle instance if one exists.
    /// Otherwise constructs a fresh instance — immediately in elastic mode,
    /// or only while a capacity slot is free in strict mode. When strict
    /// capacity is exhausted the caller blocks until a release or discard
    /// frees a slot, up to `timeout`; then the acquire fails with
    /// [`Error::Unavailable`].
    pub fn acquire(&self, timeout: Duration) -> Result<WorkerInstance> {
        let deadline = Instant::now() + timeout;
        let mut shared = self.shared.lock();
        loop {
            if shared.closed {
                return Err(Error::ShuttingDown(self.component.id().clone()));
            }
            if let Some(mut instance) = shared.idle.pop() {
                shared.outstanding += 1;
                instance.mark_acquired();
                return Ok(instance);
            }
            if !self.settings().strict || shared.outstanding < self.settings().capacity {
                return self.construct_into_slot(shared);
            }
            if self.available.wait_until(&mut shared, deadline).timed_out() {
                // A release may have raced the timeout; take one last look
                // before turning the caller away.
                if shared.closed {
                    return Err(Error::ShuttingDown(self.component.id().clone()));
                }
                if let Some(mut instance) = shared.idle.pop() {
                    shared.outstanding += 1;
                    instance.mark_acquired();
                    return Ok(instance);
                }
                if shared.outstanding < self.settings().capacity {
                    return self.construct_into_slot(shared);
                }
                return Err(Error::Unavailable {
                    component: self.component.id().clone(),
                    waited: timeout,
                });
            }
        }
    }

    /// Return a structurally sound instance to the pool.
    ///
    /// The instance goes back on top of the idle list (LIFO) if there is
    /// room; otherwise it is destroyed. Either way one blocked acquirer is
    /// woken: a pooled instance can be popped, a destroyed one frees a
    /// strict-mode slot.
    pub fn release(&self, mut instance: WorkerInstance) {
        let mut shared = self.shared.lock();
        debug_assert!(shared.outstanding > 0, "release without a matching acquire");
        shared.outstanding -= 1;

        if !shared.closed && shared.idle.len() < self.settings().capacity {
            instance.mark_ready();
            shared.idle.push(instance);
            drop(shared);
        } else {
            shared.destroyed += 1;
            drop(shared);
            self.destroy(instance);
        }
        self.available.notify_one();
    }

    /// Destroy an instance whose internal state is suspect.
    ///
    /// Runs the pre-destroy chain (best-effort) and removes the instance
    /// from outstanding accounting without pooling it. Used after
    /// system-level failures.
    pub fn discard(&self, instance: WorkerInstance) {
        {
            let mut shared = self.shared.lock();
            debug_assert!(shared.outstanding > 0, "discard without a matching acquire");
            shared.outstanding -= 1;
            shared.destroyed += 1;
        }
        tracing::debug!(
            component = %self.component.id(),
            instance = %instance.id(),
            "discarding suspect instance"
        );
        self.destroy(instance);
        self.available.notify_one();
    }

    /// Drain and pre-destroy every idle instance and refuse further
    /// acquisition. Instances still checked out are destroyed as they come
    /// back through [`release`](Self::release) or [`discard`](Self::discard).
    pub fn shutdown(&self) {
        let drained = {
            let mut shared = self.shared.lock();
            if shared.closed {
                Vec::new()
            } else {
                shared.closed = true;
                shared.destroyed += shared.idle.len() as u64;
                std::mem::take(&mut shared.idle)
            }
        };
        for instance in drained {
            self.destroy(instance);
        }
        self.available.notify_all();
    }

    /// A snapshot of the pool's occupancy counters.
    pub fn stats(&self) -> PoolStats {
        let shared = self.shared.lock();
        PoolStats {
            idle: shared.idle.len(),
            outstanding: shared.outstanding,
            created: shared.created,
            destroyed: shared.destroyed,
            capacity: self.settings().capacity,
        }
    }

    /// Reserve a slot under the lock, then construct outside it.
    ///
    /// The reservation counts as created + outstanding so the accounting
    /// invariant holds while the factory runs; both counters roll back if
    /// construction fails, and a waiter is woken because the failed
    /// reservation freed a strict-mode slot.
    fn construct_into_slot(&self, mut shared: MutexGuard<'_, Shared>) -> Result<WorkerInstance> {
        shared.outstanding += 1;
        shared.created += 1;
        drop(shared);

        match self.construct() {
            Ok(mut instance) => {
                instance.mark_acquired();
                tracing::debug!(
                    component = %self.component.id(),
                    instance = %instance.id(),
                    "constructed fresh instance on pool miss"
                );
                Ok(instance)
            }
            Err(source) => {
                {
                    let mut shared = self.shared.lock();
                    shared.outstanding -= 1;
                    shared.created -= 1;
                }
                self.available.notify_one();
                Err(Error::Construction {
                    component: self.component.id().clone(),
                    source,
                })
            }
        }
    }

    fn construct(&self) -> std::result::Result<WorkerInstance, ConstructionError> {
        let parts = {
            let _ctx =
                CallContext::lifecycle(self.component.clone(), Phase::SetContext).enter();
            self.factory.create(&self.component)?
        };
        let mut instance = WorkerInstance::new(parts);

        if let Err(e) = self.lifecycle.post_construct(&mut instance) {
            // Never expose a partially built instance: tear down whatever
            // was wired up before the failing callback.
            self.lifecycle.pre_destroy(&mut instance);
            instance.mark_destroyed();
            return Err(ConstructionError::Callback(e));
        }
        Ok(instance)
    }

    fn destroy(&self, mut instance: WorkerInstance) {
        self.lifecycle.pre_destroy(&mut instance);
        instance.mark_destroyed();
    }
}

impl std::fmt::Debug for InstancePool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let stats = self.stats();
        f.debug_struct("InstancePool")
            .field("component", self.component.id())
            .field("stats", &stats)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use corral_core::{Component, InstanceParts, Outcome, Value};
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    struct Echo;

    impl Component for Echo {
        fn dispatch(&mut self, _method: &str, args: Value) -> Outcome {
            Outcome::Success(args)
        }
    }

    #[derive(Default)]
    struct CountingFactory {
        built: AtomicUsize,
        fail: AtomicBool,
    }

    impl InstanceFactory for CountingFactory {
        fn create(
            &self,
            _component: &ComponentType,
        ) -> std::result::Result<InstanceParts, ConstructionError> {
            if self.fail.load(Ordering::SeqCst) {
                return Err(ConstructionError::Unresolved("datasource missing".into()));
            }
            self.built.fetch_add(1, Ordering::SeqCst);
            Ok(InstanceParts::bare(Box::new(Echo)))
        }
    }

    fn pool_with(settings: PoolSettings) -> (InstancePool, Arc<CountingFactory>) {
        let component = Arc::new(ComponentType::builder("echo").pool(settings).build());
        let factory = Arc::new(CountingFactory::default());
        let pool = InstancePool::new(component, factory.clone()).unwrap();
        (pool, factory)
    }

    fn strict(capacity: usize) -> PoolSettings {
        PoolSettings { capacity, strict: true, timeout: Duration::from_millis(50) }
    }

    #[test]
    fn strict_zero_capacity_fails_fast() {
        let component = Arc::new(
            ComponentType::builder("echo").pool(strict(0)).build(),
        );
        let result = InstancePool::new(component, Arc::new(CountingFactory::default()));
        assert!(matches!(result, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn acquire_reuses_most_recently_released() {
        let (pool, factory) = pool_with(strict(2));
        let a = pool.acquire(Duration::ZERO).unwrap();
        let b = pool.acquire(Duration::ZERO).unwrap();
        let (a_id, b_id) = (a.id(), b.id());

        pool.release(a);
        pool.release(b);

        // LIFO: b came back last, so b goes out first.
        assert_eq!(pool.acquire(Duration::ZERO).unwrap().id(), b_id);
        assert_eq!(pool.acquire(Duration::ZERO).unwrap().id(), a_id);
        assert_eq!(factory.built.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn construction_failure_rolls_back_accounting() {
        let (pool, factory) = pool_with(strict(1));
        factory.fail.store(true, Ordering::SeqCst);

        let err = pool.acquire(Duration::ZERO).unwrap_err();
        assert!(matches!(err, Error::Construction { .. }));

        let stats = pool.stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.created, 0);

        // The failed reservation did not poison the slot.
        factory.fail.store(false, Ordering::SeqCst);
        assert!(pool.acquire(Duration::ZERO).is_ok());
    }

    #[test]
    fn discard_frees_the_slot_and_forces_a_fresh_instance() {
        let (pool, _factory) = pool_with(strict(1));
        let first = pool.acquire(Duration::ZERO).unwrap();
        let first_id = first.id();
        pool.discard(first);

        let stats = pool.stats();
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.destroyed, 1);

        let second = pool.acquire(Duration::ZERO).unwrap();
        assert_ne!(second.id(), first_id);
        assert_eq!(pool.stats().created, 2);
    }

    #[test]
    fn elastic_pool_grows_past_capacity_but_does_not_retain() {
        let settings = PoolSettings { capacity: 1, strict: false, timeout: Duration::ZERO };
        let (pool, factory) = pool_with(settings);

        let a = pool.acquire(Duration::ZERO).unwrap();
        let b = pool.acquire(Duration::ZERO).unwrap();
        assert_eq!(factory.built.load(Ordering::SeqCst), 2);
        assert_eq!(pool.stats().outstanding, 2);

        pool.release(a);
        pool.release(b);

        let stats = pool.stats();
        assert_eq!(stats.idle, 1);
        assert_eq!(stats.destroyed, 1);
    }

    #[test]
    fn strict_exhaustion_times_out() {
        let (pool, _factory) = pool_with(strict(1));
        let held = pool.acquire(Duration::ZERO).unwrap();

        let err = pool.acquire(Duration::from_millis(30)).unwrap_err();
        assert!(matches!(err, Error::Unavailable { .. }));

        pool.release(held);
        assert!(pool.acquire(Duration::ZERO).is_ok());
    }

    #[test]
    fn shutdown_drains_idle_and_rejects_acquires() {
        let (pool, _factory) = pool_with(strict(2));
        let a = pool.acquire(Duration::ZERO).unwrap();
        pool.release(a);
        assert_eq!(pool.stats().idle, 1);

        pool.shutdown();

        let stats = pool.stats();
        assert_eq!(stats.idle, 0);
        assert_eq!(stats.destroyed, 1);
        assert!(matches!(
            pool.acquire(Duration::ZERO),
            Err(Error::ShuttingDown(_))
        ));
    }

    #[test]
    fn release_after_shutdown_destroys_the_straggler() {
        let (pool, _factory) = pool_with(strict(1));
        let held = pool.acquire(Duration::ZERO).unwrap();
        pool.shutdown();

        pool.release(held);
        let stats = pool.stats();
        assert_eq!(stats.idle, 0);
        assert_eq!(stats.outstanding, 0);
        assert_eq!(stats.destroyed, 1);
    }

    #[test]
    fn accounting_invariant_holds_through_mixed_traffic() {
        let (pool, _factory) = pool_with(strict(3));
        let check = |pool: &InstancePool| {
            let s = pool.stats();
            assert_eq!(
                (s.idle + s.outstanding) as u64,
                s.created - s.destroyed,
                "idle + outstanding must equal created - destroyed"
            );
            assert!(s.idle + s.outstanding <= s.capacity);
        };

        let a = pool.acquire(Duration::ZERO).unwrap();
        check(&pool);
        let b = pool.acquire(Duration::ZERO).unwrap();
        check(&pool);
        pool.release(a);
        check(&pool);
        pool.discard(b);
        check(&pool);
        let c = pool.acquire(Duration::ZERO).unwrap();
        check(&pool);
        pool.release(c);
        check(&pool);
    }
}

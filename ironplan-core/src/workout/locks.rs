//! Per-plan mutual exclusion
//!
//! Two passes over the same plan must not interleave: both could see an
//! existing workout and replace its exercises concurrently. Passes over
//! different plans share nothing and run in parallel.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

/// Registry of one lock per plan ID
#[derive(Debug, Default)]
pub struct PlanLocks {
    locks: Mutex<HashMap<i64, Arc<Mutex<()>>>>,
}

impl PlanLocks {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Run `f` while holding the lock for `plan_id`
    pub fn with_plan<T>(&self, plan_id: i64, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(plan_id).or_default())
        };

        // The guarded value is (), so a poisoned lock carries no bad state
        let result = {
            let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
            f()
        };

        drop(lock);
        self.release(plan_id);
        result
    }

    /// Forget the plan's lock once nobody else holds or waits on it
    fn release(&self, plan_id: i64) {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        if locks
            .get(&plan_id)
            .is_some_and(|lock| Arc::strong_count(lock) == 1)
        {
            locks.remove(&plan_id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;
    use std::time::Duration;

    #[test]
    fn test_same_plan_is_serialized() {
        let locks = PlanLocks::new();
        let inside = AtomicUsize::new(0);
        let max_inside = AtomicUsize::new(0);

        thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    locks.with_plan(7, || {
                        let now = inside.fetch_add(1, Ordering::SeqCst) + 1;
                        max_inside.fetch_max(now, Ordering::SeqCst);
                        thread::sleep(Duration::from_millis(10));
                        inside.fetch_sub(1, Ordering::SeqCst);
                    });
                });
            }
        });

        assert_eq!(max_inside.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_lock_is_released_after_use() {
        let locks = PlanLocks::new();
        let registered = || locks.locks.lock().unwrap().len();
        let value = locks.with_plan(1, || {
            assert_eq!(registered(), 1);
            42
        });
        assert_eq!(value, 42);
        assert_eq!(registered(), 0);
    }

    #[test]
    fn test_different_plans_do_not_block() {
        let locks = PlanLocks::new();
        // Nested acquisition of a different plan would deadlock if locks were shared
        let total = locks.with_plan(1, || locks.with_plan(2, || 3));
        assert_eq!(total, 3);
    }
}

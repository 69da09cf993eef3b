use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// One exclusive lock plus one condition domain guarding shared state.
///
/// A single condition is shared by every waiter regardless of which
/// predicate it waits for, so wakeups must be broadcast: waking a
/// single arbitrary thread could pick one whose predicate is still
/// false while a satisfiable waiter stays asleep.
pub(crate) struct Monitor<S> {
    state: Mutex<S>,
    cond: Condvar,
}

impl<S> Monitor<S> {
    pub fn new(state: S) -> Self {
        Self {
            state: Mutex::new(state),
            cond: Condvar::new(),
        }
    }

    /// Acquires the lock, recovering from poisoning.
    ///
    /// Every mutation completes with invariants intact before the lock
    /// is released, so the state behind a poisoned guard is consistent.
    pub fn lock(&self) -> MutexGuard<'_, S> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks on the condition, releasing the lock only while suspended.
    pub fn wait<'a>(&self, guard: MutexGuard<'a, S>) -> MutexGuard<'a, S> {
        self.cond.wait(guard).unwrap_or_else(PoisonError::into_inner)
    }

    /// Blocks on the condition for at most `timeout`.
    ///
    /// The timed-out flag is not surfaced: callers re-check their
    /// predicate and deadline after every wakeup, spurious or not.
    pub fn wait_timeout<'a>(
        &self,
        guard: MutexGuard<'a, S>,
        timeout: Duration,
    ) -> MutexGuard<'a, S> {
        match self.cond.wait_timeout(guard, timeout) {
            Ok((guard, _)) => guard,
            Err(poisoned) => poisoned.into_inner().0,
        }
    }

    /// Wakes every thread blocked on the condition.
    pub fn notify_all(&self) {
        self.cond.notify_all();
    }
}

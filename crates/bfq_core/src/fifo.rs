use std::sync::MutexGuard;
use std::time::{Duration, Instant};

use crate::FifoError;
use crate::monitor::Monitor;
use crate::ring::Ring;

/// Sentinel timeout meaning "wait indefinitely".
///
/// Every timeout in this crate is a millisecond count where zero is
/// reserved for an unbounded wait, not a zero-length one. A call made
/// with `WAIT_FOREVER` never reports a timeout.
pub const WAIT_FOREVER: u64 = 0;

struct Shared<T> {
    ring: Ring<T>,
    closed: bool,
}

/// Fixed-capacity, thread-safe FIFO queue with blocking operations.
///
/// Producers block while the queue is full, consumers block while it is
/// empty, and `wait_until_empty` blocks until every value has been
/// drained. Bounded waits take a millisecond timeout where `0` means
/// wait forever (see [`WAIT_FOREVER`]); an expired bound is a normal
/// `false` outcome, never an error. [`close`](Fifo::close) aborts all
/// blocked and future waits with [`FifoError::Closed`].
///
/// All state sits behind one monitor; every mutation wakes every
/// waiter, since "not full", "not empty", and "is empty" waiters all
/// share it. Values are stored by copy in a circular slot array sized
/// once at construction.
pub struct Fifo<T> {
    monitor: Monitor<Shared<T>>,
    capacity: usize,
}

impl<T: Copy + Default> Fifo<T> {
    /// Creates a queue holding at most `capacity` values.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "fifo capacity must be positive");
        Self {
            monitor: Monitor::new(Shared {
                ring: Ring::new(capacity),
                closed: false,
            }),
            capacity,
        }
    }

    /// Returns the fixed capacity. Never changes, so no lock is taken.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the number of stored values.
    ///
    /// This is a snapshot taken under the lock; under concurrent
    /// mutation it may be stale by the time the caller looks at it.
    /// Use [`lock`](Fifo::lock) to act on a count atomically.
    pub fn len(&self) -> usize {
        self.monitor.lock().ring.len()
    }

    /// Returns true if no values are stored. Snapshot semantics as
    /// with [`len`](Fifo::len).
    pub fn is_empty(&self) -> bool {
        self.monitor.lock().ring.is_empty()
    }

    /// Returns true if the queue holds `capacity` values. Snapshot
    /// semantics as with [`len`](Fifo::len).
    pub fn is_full(&self) -> bool {
        self.monitor.lock().ring.is_full()
    }

    /// Returns true once [`close`](Fifo::close) has been called.
    pub fn is_closed(&self) -> bool {
        self.monitor.lock().closed
    }

    /// Discards every stored value, leaving the queue empty.
    ///
    /// Wakes all waiters: producers blocked on a full queue and
    /// `wait_until_empty` callers both make progress.
    pub fn clear(&self) {
        let mut shared = self.monitor.lock();
        shared.ring.reset();
        self.monitor.notify_all();
    }

    /// Closes the queue, aborting all blocked and future waits.
    ///
    /// Waiters unblock with [`FifoError::Closed`] and queue contents
    /// are untouched. Operations that can complete without waiting
    /// still do, so remaining values can be drained after a close.
    /// Idempotent.
    pub fn close(&self) {
        let mut shared = self.monitor.lock();
        shared.closed = true;
        self.monitor.notify_all();
    }

    /// Adds `value`, waiting indefinitely while the queue is full.
    pub fn push(&self, value: T) -> Result<(), FifoError> {
        let stored = self.push_timeout(value, WAIT_FOREVER)?;
        debug_assert!(stored); // the sentinel wait cannot time out
        Ok(())
    }

    /// Adds `value`, waiting at most `ms_timeout` milliseconds while
    /// the queue is full.
    ///
    /// `ms_timeout` of [`WAIT_FOREVER`] (zero) waits indefinitely.
    /// Returns `Ok(true)` once the value is stored, or `Ok(false)` if
    /// the bound expired first, in which case nothing was stored.
    pub fn push_timeout(&self, value: T, ms_timeout: u64) -> Result<bool, FifoError> {
        let shared = self.monitor.lock();
        let (mut shared, satisfied) =
            self.wait_until(shared, ms_timeout, |s| !s.ring.is_full())?;
        if !satisfied {
            return Ok(false);
        }
        shared.ring.push(value);
        self.monitor.notify_all();
        Ok(true)
    }

    /// Removes and returns the oldest value, waiting indefinitely
    /// while the queue is empty.
    pub fn pop(&self) -> Result<T, FifoError> {
        let shared = self.monitor.lock();
        let (mut shared, _) =
            self.wait_until(shared, WAIT_FOREVER, |s| !s.ring.is_empty())?;
        let value = shared.ring.pop();
        self.monitor.notify_all();
        Ok(value)
    }

    /// Blocks until the queue is empty.
    pub fn wait_until_empty(&self) -> Result<(), FifoError> {
        let emptied = self.wait_until_empty_timeout(WAIT_FOREVER)?;
        debug_assert!(emptied);
        Ok(())
    }

    /// Blocks until the queue is empty or `ms_timeout` milliseconds
    /// elapse (`0` waits indefinitely). Returns whether the queue was
    /// observed empty. Never mutates state.
    pub fn wait_until_empty_timeout(&self, ms_timeout: u64) -> Result<bool, FifoError> {
        let shared = self.monitor.lock();
        let (_shared, satisfied) =
            self.wait_until(shared, ms_timeout, |s| s.ring.is_empty())?;
        Ok(satisfied)
    }

    /// Adds `value` only if the queue has room right now.
    pub fn try_push(&self, value: T) -> bool {
        self.lock().try_push(value)
    }

    /// Removes the oldest value only if one is stored right now.
    pub fn try_pop(&self) -> Option<T> {
        self.lock().try_pop()
    }

    /// Acquires the queue's exclusive section for a scoped multi-call
    /// sequence.
    ///
    /// While the returned guard is alive no other thread can observe
    /// or mutate the queue, so check-then-act sequences compose
    /// without interleaving. The guard exposes only non-blocking
    /// operations: a blocking call inside the section would deadlock
    /// against its own lock.
    pub fn lock(&self) -> FifoGuard<'_, T> {
        FifoGuard {
            shared: self.monitor.lock(),
            monitor: &self.monitor,
        }
    }

    /// Waits with the lock held until `pred` holds or the bound
    /// expires, returning the guard and whether the predicate held.
    ///
    /// The condition releases the lock only while blocked and
    /// reacquires it on wakeup; the predicate is re-checked after
    /// every wakeup, so spurious wakeups are harmless. A close aborts
    /// the wait with `Err(Closed)`, but a predicate that already holds
    /// wins over a close: satisfied operations are never aborted.
    fn wait_until<'a>(
        &'a self,
        mut shared: MutexGuard<'a, Shared<T>>,
        ms_timeout: u64,
        pred: fn(&Shared<T>) -> bool,
    ) -> Result<(MutexGuard<'a, Shared<T>>, bool), FifoError> {
        if pred(&shared) {
            return Ok((shared, true));
        }

        if ms_timeout == WAIT_FOREVER {
            loop {
                if shared.closed {
                    return Err(FifoError::Closed);
                }
                shared = self.monitor.wait(shared);
                if pred(&shared) {
                    return Ok((shared, true));
                }
            }
        }

        let deadline = Instant::now() + Duration::from_millis(ms_timeout);
        loop {
            if shared.closed {
                return Err(FifoError::Closed);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return Ok((shared, false));
            }
            shared = self.monitor.wait_timeout(shared, remaining);
            if pred(&shared) {
                return Ok((shared, true));
            }
        }
    }
}

/// Scoped exclusive access to a [`Fifo`].
///
/// Returned by [`Fifo::lock`]. Holds the queue's monitor for its
/// lifetime; dropping it releases the section. Mutations performed
/// through the guard broadcast to waiters just like their standalone
/// counterparts.
pub struct FifoGuard<'a, T> {
    shared: MutexGuard<'a, Shared<T>>,
    monitor: &'a Monitor<Shared<T>>,
}

impl<T: Copy + Default> FifoGuard<'_, T> {
    pub fn len(&self) -> usize {
        self.shared.ring.len()
    }

    pub fn capacity(&self) -> usize {
        self.shared.ring.capacity()
    }

    pub fn is_empty(&self) -> bool {
        self.shared.ring.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.shared.ring.is_full()
    }

    pub fn is_closed(&self) -> bool {
        self.shared.closed
    }

    /// Discards every stored value.
    pub fn clear(&mut self) {
        self.shared.ring.reset();
        self.monitor.notify_all();
    }

    /// Adds `value` if there is room, returning whether it was stored.
    pub fn try_push(&mut self, value: T) -> bool {
        if self.shared.ring.is_full() {
            return false;
        }
        self.shared.ring.push(value);
        self.monitor.notify_all();
        true
    }

    /// Removes and returns the oldest value, if any is stored.
    pub fn try_pop(&mut self) -> Option<T> {
        if self.shared.ring.is_empty() {
            return None;
        }
        let value = self.shared.ring.pop();
        self.monitor.notify_all();
        Some(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    #[test]
    #[should_panic(expected = "capacity must be positive")]
    fn zero_capacity_panics() {
        let _ = Fifo::<i64>::new(0);
    }

    #[test]
    fn snapshot_reads_track_contents() {
        let fifo = Fifo::<i64>::new(5);
        assert_eq!(fifo.capacity(), 5);
        assert!(fifo.is_empty());
        assert!(!fifo.is_full());
        assert_eq!(fifo.len(), 0);

        fifo.push(10).unwrap();
        fifo.push(20).unwrap();
        fifo.push(30).unwrap();
        assert_eq!(fifo.len(), 3);
        assert!(!fifo.is_empty());
        assert!(!fifo.is_full());

        assert_eq!(fifo.pop().unwrap(), 10);
        assert_eq!(fifo.pop().unwrap(), 20);
        assert_eq!(fifo.pop().unwrap(), 30);
        assert!(fifo.is_empty());
        assert!(!fifo.is_full());
    }

    #[test]
    fn order_preserved_across_wraparound() {
        let fifo = Fifo::<i64>::new(4);
        for v in 1..=4 {
            fifo.push(v).unwrap();
        }
        assert_eq!(fifo.pop().unwrap(), 1);
        assert_eq!(fifo.pop().unwrap(), 2);
        fifo.push(5).unwrap();
        fifo.push(6).unwrap(); // tail has wrapped past slot 0

        for expect in 3..=6 {
            assert_eq!(fifo.pop().unwrap(), expect);
        }
        assert!(fifo.is_empty());
    }

    #[test]
    fn push_timeout_expires_on_full_queue() {
        let fifo = Fifo::<i64>::new(1);
        fifo.push(1).unwrap();

        let start = Instant::now();
        let stored = fifo.push_timeout(2, 50).unwrap();
        assert!(!stored);
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.pop().unwrap(), 1);
    }

    #[test]
    fn zero_timeout_is_infinite_not_immediate() {
        let fifo = Arc::new(Fifo::<i64>::new(1));
        fifo.push(1).unwrap();

        let popper = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                fifo.pop().unwrap()
            })
        };

        // Must block until the pop makes room, never report a timeout.
        let stored = fifo.push_timeout(2, WAIT_FOREVER).unwrap();
        assert!(stored);
        assert_eq!(popper.join().unwrap(), 1);
        assert_eq!(fifo.pop().unwrap(), 2);
    }

    #[test]
    fn bounded_push_rescued_by_concurrent_pop() {
        let fifo = Arc::new(Fifo::<i64>::new(1));
        fifo.push(1).unwrap();

        let popper = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || {
                thread::sleep(Duration::from_millis(100));
                fifo.pop().unwrap()
            })
        };

        let start = Instant::now();
        let stored = fifo.push_timeout(2, 5_000).unwrap();
        assert!(stored);
        // Succeeds near the pop, far ahead of the 5 s bound.
        assert!(start.elapsed() >= Duration::from_millis(100));
        assert!(start.elapsed() < Duration::from_millis(4_000));
        assert_eq!(popper.join().unwrap(), 1);
    }

    #[test]
    fn clear_unblocks_blocked_push() {
        let fifo = Arc::new(Fifo::<i64>::new(1));
        fifo.push(1).unwrap();

        let producer = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || fifo.push(2))
        };

        thread::sleep(Duration::from_millis(50));
        fifo.clear();
        producer.join().unwrap().unwrap();

        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.pop().unwrap(), 2);
    }

    #[test]
    fn drain_leaves_empty_and_wait_returns_immediately() {
        let fifo = Fifo::<i64>::new(3);
        for v in [4, 5, 6] {
            fifo.push(v).unwrap();
        }
        for _ in 0..3 {
            fifo.pop().unwrap();
        }
        assert!(fifo.is_empty());
        fifo.wait_until_empty().unwrap();
        assert!(fifo.wait_until_empty_timeout(50).unwrap());
    }

    #[test]
    fn wait_until_empty_timeout_expires_while_occupied() {
        let fifo = Fifo::<i64>::new(2);
        fifo.push(1).unwrap();

        let start = Instant::now();
        let emptied = fifo.wait_until_empty_timeout(50).unwrap();
        assert!(!emptied);
        assert!(start.elapsed() >= Duration::from_millis(50));
        assert_eq!(fifo.len(), 1);
    }

    #[test]
    fn wait_until_empty_observes_concurrent_drain() {
        let fifo = Arc::new(Fifo::<i64>::new(5));
        for v in [10, 20, 30] {
            fifo.push(v).unwrap();
        }

        let remover = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || {
                let mut seen = Vec::new();
                for _ in 0..3 {
                    thread::sleep(Duration::from_millis(20));
                    seen.push(fifo.pop().unwrap());
                }
                seen
            })
        };

        fifo.wait_until_empty().unwrap();
        assert!(fifo.is_empty());
        assert_eq!(remover.join().unwrap(), vec![10, 20, 30]);
    }

    #[test]
    fn close_unblocks_producer_without_mutating() {
        let fifo = Arc::new(Fifo::<i64>::new(1));
        fifo.push(1).unwrap();

        let producer = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || fifo.push(2))
        };

        thread::sleep(Duration::from_millis(50));
        fifo.close();
        assert_eq!(producer.join().unwrap(), Err(FifoError::Closed));
        assert_eq!(fifo.len(), 1);
        assert_eq!(fifo.pop().unwrap(), 1); // drain still allowed
    }

    #[test]
    fn close_unblocks_consumer() {
        let fifo = Arc::new(Fifo::<i64>::new(1));

        let consumer = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || fifo.pop())
        };

        thread::sleep(Duration::from_millis(50));
        fifo.close();
        fifo.close(); // idempotent
        assert_eq!(consumer.join().unwrap(), Err(FifoError::Closed));
        assert!(fifo.is_closed());
    }

    #[test]
    fn closed_queue_still_completes_satisfied_operations() {
        let fifo = Fifo::<i64>::new(2);
        fifo.push(1).unwrap();
        fifo.close();

        // Room exists, so the push never waits and is not aborted.
        fifo.push(2).unwrap();
        assert_eq!(fifo.pop().unwrap(), 1);
        assert_eq!(fifo.pop().unwrap(), 2);
        // Now empty: a pop would have to wait, so it is aborted.
        assert_eq!(fifo.pop(), Err(FifoError::Closed));
    }

    #[test]
    fn try_variants_never_block() {
        let fifo = Fifo::<i64>::new(1);
        assert!(fifo.try_push(7));
        assert!(!fifo.try_push(8));
        assert_eq!(fifo.try_pop(), Some(7));
        assert_eq!(fifo.try_pop(), None);
    }

    #[test]
    fn guard_composes_multi_call_sequences() {
        let fifo = Fifo::<i64>::new(4);
        fifo.push(1).unwrap();
        fifo.push(2).unwrap();

        let mut guard = fifo.lock();
        assert_eq!(guard.capacity(), 4);
        assert_eq!(guard.try_pop(), Some(1));
        assert!(guard.try_push(9));
        assert_eq!(guard.len(), 2);
        assert!(!guard.is_closed());
        drop(guard);

        assert_eq!(fifo.pop().unwrap(), 2);
        assert_eq!(fifo.pop().unwrap(), 9);
    }

    #[test]
    fn guard_clear_unblocks_producer() {
        let fifo = Arc::new(Fifo::<i64>::new(1));
        fifo.push(1).unwrap();

        let producer = {
            let fifo = Arc::clone(&fifo);
            thread::spawn(move || fifo.push(2))
        };

        thread::sleep(Duration::from_millis(50));
        fifo.lock().clear();
        producer.join().unwrap().unwrap();
        assert_eq!(fifo.pop().unwrap(), 2);
    }
}

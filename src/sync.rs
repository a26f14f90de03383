//! Synchronization primitives shared between the supervisor and worker
//! threads: a binary/counting semaphore and the one-shot termination flag.
//!
//! The source uses POSIX `sem_t`. Rust's standard library has no semaphore
//! type, so this is the idiomatic host-side substitute: a `Mutex<u64>`
//! (the count) paired with a `Condvar`, which is exactly how `sem_t` is
//! implemented on hosts without a native futex-backed semaphore.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Condvar, Mutex};
use std::time::{Duration, Instant};

/// A counting semaphore. `post` increments and wakes one waiter; `wait`
/// blocks until the count is positive, then decrements it. Task `cont`/
/// `done` handles are always used at binary (0/1) capacity, but nothing
/// here assumes that — spec.md calls them "binary-capacity counting
/// semaphores", i.e. counting semaphores that happen to never exceed 1.
#[derive(Debug, Default)]
pub struct Semaphore {
    state: Mutex<u64>,
    cond: Condvar,
}

/// Returned by [`Semaphore::timed_wait`] when the deadline elapses before
/// a post arrives. Not an error — EDF/SCT treat this as the preemption
/// signal (spec.md §7: `TimedWaitTimeout` is not an error kind).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Elapsed;

impl Semaphore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(0),
            cond: Condvar::new(),
        }
    }

    /// Post once, waking at most one blocked waiter.
    pub fn post(&self) {
        let mut count = self.state.lock().unwrap_or_else(|e| e.into_inner());
        *count += 1;
        self.cond.notify_one();
    }

    /// Unbounded wait (RMA's `sem_wait(head.done)`).
    pub fn wait(&self) {
        let guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        let mut count = self
            .cond
            .wait_while(guard, |c| *c == 0)
            .unwrap_or_else(|e| e.into_inner());
        *count -= 1;
    }

    /// Bounded wait until `deadline` (EDF/SCT's `sem_timedwait`). `deadline`
    /// is a monotonic [`Instant`] rather than a POSIX absolute `timespec`:
    /// the two are equivalent for a process-local wait and `Instant` avoids
    /// the wall-clock-jump hazard `CLOCK_REALTIME` deadlines have.
    pub fn timed_wait(&self, deadline: Instant) -> Result<(), Elapsed> {
        let mut guard = self.state.lock().unwrap_or_else(|e| e.into_inner());
        loop {
            if *guard > 0 {
                *guard -= 1;
                return Ok(());
            }
            let now = Instant::now();
            if now >= deadline {
                return Err(Elapsed);
            }
            let (next_guard, timeout_result) = self
                .cond
                .wait_timeout(guard, deadline - now)
                .unwrap_or_else(|e| e.into_inner());
            guard = next_guard;
            if *guard > 0 {
                *guard -= 1;
                return Ok(());
            }
            if timeout_result.timed_out() {
                return Err(Elapsed);
            }
        }
    }
}

/// One-shot termination signal, written once by the supervisor in
/// [`crate::task::Task::stop`] and read by the worker after every `cont`
/// wake. `Ordering::Release`/`Acquire` establishes the happens-before edge
/// the source's poison-pipe-read-before-and-after pattern relied on.
#[derive(Debug, Clone)]
pub struct TerminationFlag(Arc<AtomicBool>);

impl TerminationFlag {
    pub fn new() -> Self {
        Self(Arc::new(AtomicBool::new(false)))
    }

    pub fn signal(&self) {
        self.0.store(true, Ordering::Release);
    }

    /// Clear the flag so a stopped Task can be restarted (spec.md §4.1:
    /// a Task must be reusable across runs).
    pub fn reset(&self) {
        self.0.store(false, Ordering::Release);
    }

    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

impl Default for TerminationFlag {
    fn default() -> Self {
        Self::new()
    }
}

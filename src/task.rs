//! The periodic Task model (spec.md §3, §4.1): immutable timing parameters,
//! the `r`/`a` runtime recurrence state, and the worker thread that
//! actually burns CPU on the supervisor's behalf.

use std::sync::atomic::{AtomicI64, AtomicU32, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

#[allow(deprecated)]
use std::os::unix::thread::JoinHandleExt;

use crate::error::{HarnessError, Result};
use crate::posix::{set_self_schedparam, set_thread_schedparam, KernelPolicy};
use crate::sync::{Semaphore, TerminationFlag};
use crate::timing::spin_for;
use crate::trace::{Channel, TraceSink};

/// One periodic task. `r` and `a` are the single mutable recurrence state
/// (spec.md §3); they are `Atomic*` rather than a `Cell` or `Mutex` so that
/// `Arc<Task>` stays `Sync` without `unsafe`, even though in practice only
/// the supervisor thread ever writes them (§5: "Task fields `r`, `a`, and
/// priority are mutated only by the supervisor"). `Ordering::Relaxed`
/// suffices because there is a single writer and the supervisor never
/// reads these from a *different* thread than the one that wrote them.
pub struct Task {
    id: u32,
    c: u32,
    p: u32,
    d: u32,
    r: AtomicI64,
    a: AtomicU32,
    cont: Arc<Semaphore>,
    done: Arc<Semaphore>,
    term: TerminationFlag,
    worker: std::sync::Mutex<Option<JoinHandle<()>>>,
    pthread: std::sync::Mutex<Option<libc::pthread_t>>,
}

impl Task {
    pub fn new(id: u32, c: u32, p: u32, d: u32) -> Result<Self> {
        if c == 0 || p == 0 || d == 0 || p < d || d < c {
            return Err(HarnessError::InvalidTaskParams {
                id,
                c,
                p,
                d,
                reason: "require C >= 1, D >= C, P >= D",
            });
        }
        Ok(Self {
            id,
            c,
            p,
            d,
            r: AtomicI64::new(0),
            a: AtomicU32::new(0),
            cont: Arc::new(Semaphore::new()),
            done: Arc::new(Semaphore::new()),
            term: TerminationFlag::new(),
            worker: std::sync::Mutex::new(None),
            pthread: std::sync::Mutex::new(None),
        })
    }

    pub fn id(&self) -> u32 {
        self.id
    }
    pub fn c(&self) -> u32 {
        self.c
    }
    pub fn p(&self) -> u32 {
        self.p
    }
    pub fn d(&self) -> u32 {
        self.d
    }

    pub fn r(&self) -> i64 {
        self.r.load(Ordering::Relaxed)
    }
    pub fn set_r(&self, value: i64) {
        self.r.store(value, Ordering::Relaxed);
    }
    pub fn add_r(&self, delta: i64) {
        self.r.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn a(&self) -> u32 {
        self.a.load(Ordering::Relaxed)
    }
    pub fn set_a(&self, value: u32) {
        self.a.store(value, Ordering::Relaxed);
    }
    pub fn add_a(&self, delta: u32) {
        self.a.fetch_add(delta, Ordering::Relaxed);
    }

    pub fn is_ready(&self) -> bool {
        self.r() <= 0
    }

    /// `C - a`: quanta of work left in the current release.
    pub fn completion_time(&self) -> i64 {
        self.c as i64 - self.a() as i64
    }

    /// `D + r`: quanta available until the deadline, from now.
    pub fn remaining_time(&self) -> i64 {
        self.d as i64 + self.r()
    }

    pub fn already_executing(&self) -> bool {
        self.a() > 0
    }

    pub fn done(&self) -> &Semaphore {
        &self.done
    }

    pub fn cont(&self) -> &Semaphore {
        &self.cont
    }

    /// Spawn the worker thread at `initial_prio` under `policy_code`,
    /// resetting `a = 0, r = 0` so the Task can be reused across runs
    /// (spec.md §4.1: "Must reset a=0, r=0 on every start").
    pub fn start(self: &Arc<Self>, policy_code: KernelPolicy, initial_prio: i32) -> Result<()> {
        self.set_a(0);
        self.set_r(0);
        self.term.reset();

        let task = Arc::clone(self);
        let build = std::thread::Builder::new().name(format!("rtsched-task-{}", self.id));
        let handle = build
            .spawn(move || task.worker_loop(policy_code, initial_prio))
            .map_err(|source| HarnessError::TaskStartFailed {
                task_id: self.id,
                source,
            })?;

        #[allow(deprecated)]
        let pthread_id = handle.as_pthread_t();
        *self.pthread.lock().unwrap_or_else(|e| e.into_inner()) = Some(pthread_id);
        *self.worker.lock().unwrap_or_else(|e| e.into_inner()) = Some(handle);
        Ok(())
    }

    fn worker_loop(self: Arc<Self>, policy_code: KernelPolicy, initial_prio: i32) {
        if let Err(err) = set_self_schedparam(policy_code, initial_prio) {
            tracing::warn!(task_id = self.id, error = %err, "failed to set worker scheduling params");
        }
        let _ = crate::posix::pin_to_cpu0();

        loop {
            self.cont.wait();
            if self.term.is_set() {
                return;
            }
            spin_for(self.c);
            self.done.post();
        }
    }

    /// Change the worker's kernel priority; called by the Scheduler every
    /// tick (spec.md §4.1, §4.4 step 2).
    pub fn set_prio(&self, prio: i32) {
        let pthread_id = *self.pthread.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(pthread_id) = pthread_id {
            if let Err(err) = set_thread_schedparam(pthread_id, KernelPolicy::Fifo, prio) {
                tracing::warn!(task_id = self.id, error = %err, "failed to set worker priority");
            }
        }
    }

    /// Emit a trace span covering one CPU burn — used by the Scheduler
    /// around the release so the Trace collaborator sees worker begin/end
    /// bracketing the supervisor's own tick.
    pub fn trace_burn(&self, sink: &dyn TraceSink, begin: bool) {
        if begin {
            sink.trace_begin(Channel::Task(self.id));
        } else {
            sink.trace_end(Channel::Task(self.id));
        }
    }

    /// Terminate the worker: signal, wake it, join, drop the handle.
    /// Idempotent — a Task that was never started has nothing to stop.
    pub fn stop(&self) -> Result<()> {
        self.term.signal();
        self.cont.post();
        let handle = self.worker.lock().unwrap_or_else(|e| e.into_inner()).take();
        if let Some(handle) = handle {
            handle.join().map_err(|_| HarnessError::SyncPrimitiveFailed {
                task_id: self.id,
                reason: "worker thread panicked".into(),
            })?;
        }
        *self.pthread.lock().unwrap_or_else(|e| e.into_inner()) = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_invalid_params() {
        assert!(Task::new(1, 0, 5, 5).is_err());
        assert!(Task::new(1, 6, 5, 5).is_err());
        assert!(Task::new(1, 1, 3, 5).is_err());
    }

    #[test]
    fn completion_and_remaining_time() {
        let task = Task::new(1, 3, 10, 8).unwrap();
        assert_eq!(task.completion_time(), 3);
        task.set_a(2);
        assert_eq!(task.completion_time(), 1);
        task.set_r(-4);
        assert_eq!(task.remaining_time(), 4);
    }

    #[test]
    fn start_resets_state_and_stop_joins_cleanly() {
        let task = Arc::new(Task::new(1, 1, 5, 5).unwrap());
        task.set_a(7);
        task.set_r(99);
        task.start(KernelPolicy::Fifo, 7).unwrap();
        assert_eq!(task.a(), 0);
        assert_eq!(task.r(), 0);

        task.cont().post();
        task.done().wait();
        assert!(task.stop().is_ok());
    }
}

//! Policy plug-ins (spec.md §4.5, §9). The source uses a function-pointer
//! vtable of four hooks (`init`, `schedule`, `block`, `recalc`) over a
//! Scheduler reference; this rewrite uses a `Policy` trait plus a
//! `PolicyKind` tag instead of inheritance, per the REDESIGN FLAGS note.

mod edf;
mod rma;
mod sct;

use std::sync::Arc;
use std::time::Instant;

use crate::posix::KernelPolicy;
use crate::sync::Elapsed;
use crate::task::Task;

pub use edf::Edf;
pub use rma::Rma;
pub use sct::Sct;

/// What happened when the supervisor blocked on the ReadyQueue head.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockOutcome {
    /// The head ran to completion and posted `done` (RMA always; EDF/SCT
    /// when the burn finished before the preemption deadline).
    Completed,
    /// The preemption deadline elapsed first (EDF/SCT only — not an
    /// error, spec.md §7: "TimedWaitTimeout... is the policy's
    /// preemption signal").
    Preempted,
}

/// A concrete scheduling strategy: ordering, blocking discipline, and the
/// `r`/`a` recurrence. `init`/`schedule`/`block`/`recalc` below correspond
/// 1:1 to the four hooks spec.md §4.5 describes.
pub trait Policy: Send + Sync {
    fn kind(&self) -> PolicyKind;

    /// Preferred kernel scheduling policy code (`init` hook — FIFO-class
    /// in all three cases per spec.md).
    fn kernel_policy(&self) -> KernelPolicy {
        KernelPolicy::Fifo
    }

    /// ReadyQueue ordering key, ascending (`schedule` hook's comparator).
    fn ordering_key(&self, task: &Task) -> i64;

    /// Block the supervisor on `head.done` (`block` hook). Returns whether
    /// the head completed its burn or the preemption deadline elapsed.
    fn block(&self, head: &Task) -> BlockOutcome;

    /// Recompute `r`/`a` for every task given what just happened
    /// (`recalc` hook). `head` is `None` on an idle tick.
    fn recalc(&self, tasks: &[Arc<Task>], head: Option<&Arc<Task>>);
}

/// Tag identifying which concrete `Policy` is in play — used for trace
/// channel ids, CLI output ("ALGO a"), and `Harness` bookkeeping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PolicyKind {
    Rma,
    Edf,
    Sct,
}

impl PolicyKind {
    pub fn name(self) -> &'static str {
        match self {
            PolicyKind::Rma => "RMA",
            PolicyKind::Edf => "EDF",
            PolicyKind::Sct => "SCT",
        }
    }

    pub fn build(self) -> Box<dyn Policy> {
        match self {
            PolicyKind::Rma => Box::new(Rma::new()),
            PolicyKind::Edf => Box::new(Edf::new()),
            PolicyKind::Sct => Box::new(Sct::new()),
        }
    }
}

/// `min r` across all tasks — the idle-tick Δ shared by all three policies'
/// `recalc` (spec.md: "Else (idle tick): Δ = min r across all Tasks").
pub(crate) fn min_r(tasks: &[Arc<Task>]) -> i64 {
    tasks.iter().map(|t| t.r()).min().unwrap_or(0)
}

/// Apply the shared "every non-head task loses Δ of its countdown" clause
/// common to all three recalcs.
pub(crate) fn decrement_non_head(tasks: &[Arc<Task>], head_id: Option<u32>, delta: i64) {
    for t in tasks {
        if Some(t.id()) != head_id {
            t.add_r(-delta);
        }
    }
}

/// Block via unbounded `sem_wait` — RMA's discipline (non-preemptive).
pub(crate) fn block_unbounded(head: &Task) -> BlockOutcome {
    head.done().wait();
    BlockOutcome::Completed
}

/// Block via `sem_timedwait(done, now + period*quantum + jitter)` — the
/// shared EDF/SCT discipline (preemptive).
pub(crate) fn block_timed(head: &Task, period_quanta: u32, jitter: std::time::Duration) -> BlockOutcome {
    let deadline: Instant = crate::timing::abstime_in_quanta(period_quanta, jitter);
    match head.done().timed_wait(deadline) {
        Ok(()) => BlockOutcome::Completed,
        Err(Elapsed) => BlockOutcome::Preempted,
    }
}

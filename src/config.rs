//! Compile-time constants governing quantum length, priority band, and the
//! preemptive policies' block timeout. Mirrors the source's `#define` table
//! (fixt.h / timing.h) as a typed `const` table instead.

use std::time::Duration;

use crate::policy::PolicyKind;
use crate::task_set::TaskSet;

/// Wall-clock milliseconds one quantum burns on the host CPU.
pub const QUANTUM_MS: u64 = 10;

/// Default wall-clock budget, in seconds, the driver gives each
/// (policy, task set) pairing before declaring PASS.
pub const SECONDS_PER_TEST: u64 = 1;

/// Supervisor priority. Strictly above every worker whenever the
/// supervisor is runnable (invariant I3).
pub const BASE_PRIO: i32 = 10;

/// Floor for worker priorities; the ReadyQueue tail never drops below this.
pub const MIN_PRIO: i32 = 7;

/// Preemption period for EDF, in quanta.
pub const EDF_PERIOD: u32 = 1;

/// Preemption period for SCT, in quanta.
pub const SCT_PERIOD: u32 = 1;

/// Jitter allowance added to EDF's `sem_timedwait` deadline.
pub const EDF_JITTER: Duration = Duration::from_nanos(2_000_000);

/// Jitter allowance added to SCT's `sem_timedwait` deadline.
pub const SCT_JITTER: Duration = Duration::from_nanos(2_000_000);

/// The subset of scheduling parameters a caller may vary without touching
/// the core engine: which policies to exercise, over which task sets, and
/// for how long. Everything else (BASE_PRIO, the quantum, the jitter
/// allowances) is a fixed property of the host/policy pairing, not a
/// per-run knob — spec.md's "no environment variables required" extends to
/// these.
pub struct HarnessConfig {
    pub wall_clock_budget: Duration,
    pub task_sets: Vec<TaskSet>,
    pub policies: Vec<PolicyKind>,
}

impl HarnessConfig {
    pub fn new(task_sets: Vec<TaskSet>, policies: Vec<PolicyKind>) -> Self {
        Self {
            wall_clock_budget: Duration::from_secs(SECONDS_PER_TEST),
            task_sets,
            policies,
        }
    }
}

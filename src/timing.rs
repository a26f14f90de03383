//! The Timing collaborator (spec.md §6): calibrated CPU-burn quanta and
//! the absolute-deadline arithmetic the preemptive policies block on.
//! Out of core scope per spec.md §1 ("calibration ... treated as an
//! opaque `spin_for(n_quanta)` primitive"), but the primitive itself must
//! exist for the crate to run, so it is implemented here, not mocked.

use std::hint::black_box;
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use crate::config::QUANTUM_MS;
use crate::error::{HarnessError, Result};
use crate::posix::{set_self_schedparam, KernelPolicy};

/// A wall-clock instant expressed as POSIX would: seconds and nanoseconds.
/// Used only where the external interface is observed (CSV trace output);
/// blocking code uses monotonic [`Instant`]s instead (see `sync.rs`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawTimespec {
    pub sec: i64,
    pub nsec: i64,
}

impl RawTimespec {
    pub fn now() -> Self {
        let d = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default();
        Self {
            sec: d.as_secs() as i64,
            nsec: d.subsec_nanos() as i64,
        }
    }
}

/// `out = x - y`. Returns `(delta, negative)` where `negative` is true if
/// `x < y` — spec.md: "returns negative-result flag".
pub fn timespec_sub(x: RawTimespec, y: RawTimespec) -> (Duration, bool) {
    let xn = x.sec as i128 * 1_000_000_000 + x.nsec as i128;
    let yn = y.sec as i128 * 1_000_000_000 + y.nsec as i128;
    let diff = xn - yn;
    if diff >= 0 {
        (Duration::from_nanos(diff as u64), false)
    } else {
        (Duration::from_nanos((-diff) as u64), true)
    }
}

/// Absolute deadline `now + n_quanta * QUANTUM_MS + jitter`, used by the
/// preemptive policies' `sem_timedwait` (§4.5.2, §4.5.3).
pub fn abstime_in_quanta(n_quanta: u32, jitter: Duration) -> Instant {
    Instant::now() + Duration::from_millis(n_quanta as u64 * QUANTUM_MS) + jitter
}

/// Burn `n_quanta * QUANTUM_MS` milliseconds of CPU. Busy-loops against a
/// monotonic clock rather than sleeping — the worker's execution time must
/// actually occupy the CPU for the ReadyQueue head to be preemptible at
/// all (spec.md §4.1: "consumes CPU for `C` quanta"). `black_box` defeats
/// the dead-code-elimination the source's comment warns a naive loop would
/// be vulnerable to.
pub fn spin_for(n_quanta: u32) {
    let deadline = Instant::now() + Duration::from_millis(n_quanta as u64 * QUANTUM_MS);
    let mut counter: u64 = 0;
    while Instant::now() < deadline {
        counter = black_box(counter.wrapping_add(1));
    }
    black_box(counter);
}

/// One-time calibration. Because `spin_for` already burns against a
/// monotonic clock rather than a fixed iteration count, there is no
/// per-host loop-count to tune; `calibrate` instead raises the calling
/// thread's priority (as the source's calibration routine does, to keep
/// itself from being preempted mid-measurement) and verifies the clock
/// actually advances by approximately `QUANTUM_MS` per `spin_for(1)` call,
/// catching a host whose monotonic clock is too coarse to simulate
/// quanta-level timing at all.
pub fn calibrate() -> Result<()> {
    let _ = set_self_schedparam(KernelPolicy::Fifo, crate::config::BASE_PRIO);

    let start = Instant::now();
    spin_for(1);
    let elapsed = start.elapsed();

    let target = Duration::from_millis(QUANTUM_MS);
    let lower = target / 2;
    let upper = target * 4;
    if elapsed < lower || elapsed > upper {
        return Err(HarnessError::CalibrationFailed {
            reason: format!(
                "spin_for(1) took {:?}, expected ~{:?} (tolerance {:?}..{:?})",
                elapsed, target, lower, upper
            ),
        });
    }
    Ok(())
}

//! Thin POSIX FFI wrappers: the priority-piloting primitive (§4.4, §9) and
//! single-core CPU affinity pinning (§5). Grounded on the QNX thread-priority
//! FFI pattern (raw `pthread_setschedparam`/`sched_param`) common to
//! real-time Rust code that must reach below `std::thread`'s portable
//! surface; here expressed through the `libc` crate rather than hand-rolled
//! `extern "C"` blocks.

use std::io;

/// Kernel scheduling policy a Task or the supervisor may run under. All
/// three of this crate's policies request `Fifo` (spec.md: "preferred
/// kernel policy code (FIFO-class in all three cases)").
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KernelPolicy {
    Fifo,
    RoundRobin,
}

impl KernelPolicy {
    fn as_raw(self) -> libc::c_int {
        match self {
            KernelPolicy::Fifo => libc::SCHED_FIFO,
            KernelPolicy::RoundRobin => libc::SCHED_RR,
        }
    }
}

/// Set the scheduling policy and priority of the *calling* thread.
///
/// Returns `Err` only on an unexpected failure (e.g. invalid priority
/// range). `EPERM` (host lacks `CAP_SYS_NICE`/an elevated real-time
/// `ulimit`) is reported to the caller via the returned bool rather than
/// as an `Err`, since running without real-time privileges is the common
/// case on developer machines and CI, and the coordination logic under
/// test does not require the OS to actually honor the request (see
/// SPEC_FULL.md §4.1).
pub fn set_self_schedparam(policy: KernelPolicy, priority: i32) -> io::Result<bool> {
    unsafe {
        let param = libc::sched_param {
            sched_priority: priority,
        };
        let rc = libc::pthread_setschedparam(libc::pthread_self(), policy.as_raw(), &param);
        if rc == 0 {
            Ok(true)
        } else if rc == libc::EPERM {
            Ok(false)
        } else {
            Err(io::Error::from_raw_os_error(rc))
        }
    }
}

/// Set the scheduling policy and priority of a worker thread identified by
/// its `pthread_t` handle (obtained via
/// `std::os::unix::thread::JoinHandleExt::as_pthread_t`).
pub fn set_thread_schedparam(
    thread: libc::pthread_t,
    policy: KernelPolicy,
    priority: i32,
) -> io::Result<bool> {
    unsafe {
        let param = libc::sched_param {
            sched_priority: priority,
        };
        let rc = libc::pthread_setschedparam(thread, policy.as_raw(), &param);
        if rc == 0 {
            Ok(true)
        } else if rc == libc::EPERM {
            Ok(false)
        } else {
            Err(io::Error::from_raw_os_error(rc))
        }
    }
}

/// Pin the calling thread to CPU 0, satisfying spec.md's single-CPU
/// simulation assumption on multi-core hosts. Linux-only: the BSDs and
/// Illumos expose affinity through non-uniform APIs `libc` does not wrap
/// portably, and spec.md does not mandate a specific mechanism.
#[cfg(target_os = "linux")]
pub fn pin_to_cpu0() -> io::Result<()> {
    unsafe {
        let mut set: libc::cpu_set_t = std::mem::zeroed();
        libc::CPU_ZERO(&mut set);
        libc::CPU_SET(0, &mut set);
        let rc = libc::sched_setaffinity(0, std::mem::size_of::<libc::cpu_set_t>(), &set);
        if rc == 0 {
            Ok(())
        } else {
            Err(io::Error::last_os_error())
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub fn pin_to_cpu0() -> io::Result<()> {
    tracing::debug!("CPU affinity pinning is a no-op on this platform");
    Ok(())
}

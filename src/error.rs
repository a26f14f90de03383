//! Error kinds for the harness. See §7 of the design spec for propagation
//! policy: failures here abort the *current* (policy, task set) pair only,
//! except `CalibrationFailed`, which is fatal to the whole run.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to start worker thread for task {task_id}: {source}")]
    TaskStartFailed {
        task_id: u32,
        #[source]
        source: std::io::Error,
    },

    #[error("synchronization primitive failed for task {task_id}: {reason}")]
    SyncPrimitiveFailed { task_id: u32, reason: String },

    #[error("timing calibration did not converge: {reason}")]
    CalibrationFailed { reason: String },

    #[error("task set {id} must contain at least one task")]
    EmptyTaskSet { id: u32 },

    #[error("task {id} has invalid parameters C={c} P={p} D={d}: {reason}")]
    InvalidTaskParams {
        id: u32,
        c: u32,
        p: u32,
        d: u32,
        reason: &'static str,
    },
}

pub type Result<T> = std::result::Result<T, HarnessError>;

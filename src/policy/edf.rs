//! Earliest-Deadline-First, preemptive (spec.md §4.5.2). Dynamic priority
//! by time remaining until deadline; the worker may be preempted once per
//! quantum.

use std::sync::Arc;

use super::{block_timed, decrement_non_head, min_r, BlockOutcome, Policy, PolicyKind};
use crate::config::{EDF_JITTER, EDF_PERIOD};
use crate::task::Task;

#[derive(Debug, Default)]
pub struct Edf;

impl Edf {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for Edf {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Edf
    }

    /// Ascending by `remaining_time = D + r`: the nearest deadline wins.
    fn ordering_key(&self, task: &Task) -> i64 {
        task.remaining_time()
    }

    fn block(&self, head: &Task) -> BlockOutcome {
        block_timed(head, EDF_PERIOD, EDF_JITTER)
    }

    fn recalc(&self, tasks: &[Arc<Task>], head: Option<&Arc<Task>>) {
        let delta = match head {
            Some(_) => EDF_PERIOD as i64,
            None => min_r(tasks),
        };

        if let Some(head) = head {
            head.add_a(delta as u32);
            if head.completion_time() > 0 {
                head.add_r(-delta);
            } else {
                head.set_r(head.p() as i64 - delta + head.r());
                head.set_a(0);
            }
        }

        decrement_non_head(tasks, head.map(|t| t.id()), delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    #[test]
    fn ordering_key_is_remaining_time() {
        let policy = Edf::new();
        let t = Task::new(0, 1, 5, 5).unwrap();
        t.set_r(-2);
        assert_eq!(policy.ordering_key(&t), 3); // D + r = 5 - 2
    }

    #[test]
    fn recalc_mid_burn_keeps_task_ready() {
        let policy = Edf::new();
        let head = Arc::new(Task::new(0, 3, 10, 10).unwrap());
        let tasks = vec![head.clone()];

        policy.recalc(&tasks, Some(&head));

        assert_eq!(head.a(), 1);
        assert_eq!(head.r(), -1); // still <= 0, stays ready
        assert!(head.is_ready());
    }

    #[test]
    fn recalc_final_quantum_rotates_release() {
        let policy = Edf::new();
        let head = Arc::new(Task::new(0, 1, 5, 5).unwrap());
        let tasks = vec![head.clone()];

        policy.recalc(&tasks, Some(&head));

        assert_eq!(head.a(), 0);
        assert_eq!(head.r(), 4); // P - delta + r = 5 - 1 + 0
    }
}

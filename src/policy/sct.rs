//! Shortest-Completion-Time, preemptive (spec.md §4.5.3). Dynamic priority
//! by work remaining in the current release; identical block/recalc shape
//! to EDF, different ordering key.

use std::sync::Arc;

use super::{block_timed, decrement_non_head, min_r, BlockOutcome, Policy, PolicyKind};
use crate::config::{SCT_JITTER, SCT_PERIOD};
use crate::task::Task;

#[derive(Debug, Default)]
pub struct Sct;

impl Sct {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for Sct {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Sct
    }

    /// Ascending by `completion_time = C - a`: least work left wins.
    fn ordering_key(&self, task: &Task) -> i64 {
        task.completion_time()
    }

    fn block(&self, head: &Task) -> BlockOutcome {
        block_timed(head, SCT_PERIOD, SCT_JITTER)
    }

    fn recalc(&self, tasks: &[Arc<Task>], head: Option<&Arc<Task>>) {
        let delta = match head {
            Some(_) => SCT_PERIOD as i64,
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
    fn ordering_key_is_completion_time() {
        let policy = Sct::new();
        let t = Task::new(0, 5, 10, 10).unwrap();
        t.set_a(2);
        assert_eq!(policy.ordering_key(&t), 3); // C - a
    }

    #[test]
    fn head_with_least_remaining_work_sorts_first() {
        let policy = Sct::new();
        let short = Task::new(0, 2, 10, 10).unwrap();
        short.set_a(1); // 1 quantum left
        let long = Task::new(1, 5, 10, 10).unwrap(); // 5 quanta left
        assert!(policy.ordering_key(&short) < policy.ordering_key(&long));
    }
}

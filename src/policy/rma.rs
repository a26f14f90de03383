//! Rate-Monotonic, non-preemptive (spec.md §4.5.1). Static priority by
//! period; the worker always runs to completion once released.

use std::sync::Arc;

use super::{block_unbounded, decrement_non_head, min_r, BlockOutcome, Policy, PolicyKind};
use crate::task::Task;

#[derive(Debug, Default)]
pub struct Rma;

impl Rma {
    pub fn new() -> Self {
        Self
    }
}

impl Policy for Rma {
    fn kind(&self) -> PolicyKind {
        PolicyKind::Rma
    }

    /// Ascending by period: shorter period, higher priority.
    fn ordering_key(&self, task: &Task) -> i64 {
        task.p() as i64
    }

    /// Unbounded `sem_wait(head.done)` — the worker must complete.
    fn block(&self, head: &Task) -> BlockOutcome {
        block_unbounded(head)
    }

    fn recalc(&self, tasks: &[Arc<Task>], head: Option<&Arc<Task>>) {
        let delta = match head {
            Some(head) => head.c() as i64,
            None => min_r(tasks),
        };

        if let Some(head) = head {
            head.set_r(head.p() as i64 - delta + head.r());
            head.set_a(0);
        }

        decrement_non_head(tasks, head.map(|t| t.id()), delta);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    #[test]
    fn ordering_key_is_period() {
        let policy = Rma::new();
        let t = Task::new(0, 1, 7, 7).unwrap();
        assert_eq!(policy.ordering_key(&t), 7);
    }

    #[test]
    fn recalc_completed_release_resets_a_and_rotates_r() {
        let policy = Rma::new();
        let head = Arc::new(Task::new(0, 1, 5, 5).unwrap());
        let other = Arc::new(Task::new(1, 2, 8, 8).unwrap());
        head.set_a(1);
        let tasks = vec![head.clone(), other.clone()];

        policy.recalc(&tasks, Some(&head));

        assert_eq!(head.a(), 0);
        assert_eq!(head.r(), 4); // P - C + r = 5 - 1 + 0
        assert_eq!(other.r(), -1); // 0 - delta(1)
    }

    #[test]
    fn recalc_idle_tick_uses_min_r() {
        let policy = Rma::new();
        let a = Arc::new(Task::new(0, 1, 5, 5).unwrap());
        let b = Arc::new(Task::new(1, 1, 100, 100).unwrap());
        a.set_r(3);
        b.set_r(7);
        let tasks = vec![a.clone(), b.clone()];

        policy.recalc(&tasks, None);

        assert_eq!(a.r(), 0); // 3 - 3
        assert_eq!(b.r(), 4); // 7 - 3
    }
}

//! An identified, ordered collection of Tasks (spec.md §4.2). Owns its
//! Tasks' lifecycle: constructed here, destroyed here.

use std::sync::Arc;

use crate::error::{HarnessError, Result};
use crate::task::Task;

pub struct TaskSet {
    id: u32,
    tasks: Vec<Arc<Task>>,
}

impl TaskSet {
    /// Build from a typed sequence of `(C, P, D)` triples — the
    /// REDESIGN FLAGS replacement for the source's variadic
    /// `TaskSet::new(id, count, ...)` constructor.
    pub fn new(id: u32, params: Vec<(u32, u32, u32)>) -> Result<Self> {
        if params.is_empty() {
            return Err(HarnessError::EmptyTaskSet { id });
        }
        let tasks = params
            .into_iter()
            .enumerate()
            .map(|(i, (c, p, d))| Task::new(i as u32, c, p, d).map(Arc::new))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { id, tasks })
    }

    pub fn id(&self) -> u32 {
        self.id
    }

    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    pub fn utilization(&self) -> f64 {
        self.tasks
            .iter()
            .map(|t| t.c() as f64 / t.p() as f64)
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_set() {
        assert!(TaskSet::new(1, vec![]).is_err());
    }

    #[test]
    fn utilization_matches_source_task_set_two() {
        let set = TaskSet::new(2, vec![(1, 7, 7), (2, 5, 5), (1, 8, 8), (1, 10, 10), (2, 16, 16)])
            .unwrap();
        assert!((set.utilization() - 0.948).abs() < 0.001);
    }
}

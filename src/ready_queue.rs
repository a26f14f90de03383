//! The transient per-tick ready list (spec.md §4.3). Rebuilt every
//! `schedule()` call from the subset of Tasks with `r <= 0`, then sorted
//! by the active policy's comparator. Holds references only — it does not
//! own Tasks (I5).

use std::sync::Arc;

use crate::task::Task;

#[derive(Default)]
pub struct ReadyQueue {
    entries: Vec<Arc<Task>>,
}

impl ReadyQueue {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    /// Rebuild from `tasks`, keeping only ready entries (`r <= 0`) and
    /// sorting by `key`, ascending. `slice::sort_by` is a stable sort —
    /// spec.md: "Sort stability is not required; a stable sort is
    /// preferable to make traces reproducible."
    pub fn rebuild<F>(&mut self, tasks: &[Arc<Task>], mut key: F)
    where
        F: FnMut(&Task) -> i64,
    {
        self.entries.clear();
        self.entries.extend(tasks.iter().filter(|t| t.is_ready()).cloned());
        self.entries.sort_by(|a, b| key(a).cmp(&key(b)));
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn head(&self) -> Option<&Arc<Task>> {
        self.entries.first()
    }

    /// All entries in ascending priority order (head first).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<Task>> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::task::Task;

    fn ready(id: u32, c: u32, p: u32, d: u32, r: i64) -> Arc<Task> {
        let t = Arc::new(Task::new(id, c, p, d).unwrap());
        t.set_r(r);
        t
    }

    #[test]
    fn rebuild_filters_and_sorts() {
        let tasks = vec![
            ready(0, 1, 10, 10, 0),
            ready(1, 1, 5, 5, 3), // not ready
            ready(2, 1, 3, 3, 0),
        ];
        let mut queue = ReadyQueue::new();
        queue.rebuild(&tasks, |t| t.p() as i64);
        assert_eq!(queue.len(), 2);
        assert_eq!(queue.head().unwrap().id(), 2);
    }

    #[test]
    fn empty_when_nothing_ready() {
        let tasks = vec![ready(0, 1, 10, 10, 5)];
        let mut queue = ReadyQueue::new();
        queue.rebuild(&tasks, |t| t.p() as i64);
        assert!(queue.is_empty());
        assert!(queue.head().is_none());
    }
}

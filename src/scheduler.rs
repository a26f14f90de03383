//! The Scheduler core (spec.md §4.4): priority piloting, the tick, and the
//! feasibility check. This is the piece that turns user-space ReadyQueue
//! order into kernel dispatch order — see spec.md §4.4 "why this works".

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use crate::config::{BASE_PRIO, MIN_PRIO};
use crate::error::Result;
use crate::policy::{BlockOutcome, Policy};
use crate::posix::set_self_schedparam;
use crate::ready_queue::ReadyQueue;
use crate::task::Task;
use crate::timing::spin_for;
use crate::trace::{Channel, TraceSink};

pub struct Scheduler {
    tasks: Vec<Arc<Task>>,
    ready_queue: ReadyQueue,
    policy: Box<dyn Policy>,
    trace: Arc<dyn TraceSink>,
    algo_index: u32,
    schedulable: bool,
    tick: AtomicU32,
}

impl Scheduler {
    pub fn new(policy: Box<dyn Policy>, trace: Arc<dyn TraceSink>, algo_index: u32) -> Self {
        Self {
            tasks: Vec::new(),
            ready_queue: ReadyQueue::new(),
            policy,
            trace,
            algo_index,
            schedulable: true,
            tick: AtomicU32::new(0),
        }
    }

    pub fn add_task(&mut self, task: Arc<Task>) {
        self.tasks.push(task);
    }

    pub fn is_schedulable(&self) -> bool {
        self.schedulable
    }

    pub fn tick_count(&self) -> u32 {
        self.tick.load(Ordering::Relaxed)
    }

    /// The Tasks registered with this Scheduler, in registration order.
    pub fn tasks(&self) -> &[Arc<Task>] {
        &self.tasks
    }

    /// The ReadyQueue as of the last `schedule()` call.
    pub fn ready_queue(&self) -> &ReadyQueue {
        &self.ready_queue
    }

    /// Raise the supervisor to `BASE_PRIO` under the policy's kernel
    /// class, then start every registered Task at `BASE_PRIO - 1`
    /// (spec.md §4.4).
    pub fn init(&mut self) -> Result<()> {
        if let Err(err) = set_self_schedparam(self.policy.kernel_policy(), BASE_PRIO) {
            tracing::warn!(error = %err, "failed to raise supervisor priority");
        }
        let _ = crate::posix::pin_to_cpu0();

        for task in &self.tasks {
            task.start(self.policy.kernel_policy(), BASE_PRIO - 1)?;
        }
        self.schedulable = true;
        Ok(())
    }

    /// Rebuild the ReadyQueue via the policy comparator, then run the
    /// feasibility check and store the result in `schedulable`.
    pub fn schedule(&mut self) {
        self.ready_queue
            .rebuild(&self.tasks, |t| self.policy.ordering_key(t));
        self.schedulable = self.feasibility_check();
    }

    /// spec.md §4.4: head needs `completion_time <= remaining_time`; every
    /// other ready task needs the strict form, since by next tick it will
    /// have one quantum less available.
    fn feasibility_check(&self) -> bool {
        let mut ok = true;
        for (i, task) in self.ready_queue.iter().enumerate() {
            if i == 0 {
                ok &= task.completion_time() <= task.remaining_time();
            } else {
                ok &= task.completion_time() < task.remaining_time();
            }
        }
        ok
    }

    /// One tick of piloted execution (spec.md §4.4 steps 1-5).
    pub fn run(&mut self) {
        self.trace.trace_begin(Channel::Algo(self.algo_index));

        if self.ready_queue.is_empty() {
            let idle_delta = crate::policy::min_r(&self.tasks).max(0) as u32;
            spin_for(idle_delta);
            self.policy.recalc(&self.tasks, None);
        } else {
            self.pilot_priorities();

            let head = self.ready_queue.head().expect("checked non-empty above").clone();
            if !head.already_executing() {
                head.cont().post();
            }

            head.trace_burn(self.trace.as_ref(), true);
            let outcome = self.policy.block(&head);
            head.trace_burn(self.trace.as_ref(), false);

            if outcome == BlockOutcome::Preempted {
                tracing::trace!(task_id = head.id(), "preempted at quantum boundary");
            }

            self.policy.recalc(&self.tasks, Some(&head));
        }

        self.trace.trace_end(Channel::Algo(self.algo_index));
        self.tick.fetch_add(1, Ordering::Relaxed);
    }

    /// Walk the ReadyQueue assigning strictly descending priorities
    /// starting at `BASE_PRIO - 1`, floored at `MIN_PRIO` (step 2).
    fn pilot_priorities(&self) {
        for (i, task) in self.ready_queue.iter().enumerate() {
            let prio = (BASE_PRIO - 1 - i as i32).max(MIN_PRIO);
            task.set_prio(prio);
        }
    }

    /// Stop every Task and clear the list.
    pub fn halt(&mut self) -> Result<()> {
        for task in &self.tasks {
            task.stop()?;
        }
        self.tasks.clear();
        Ok(())
    }
}

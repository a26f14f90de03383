//! The Harness driver (spec.md §4.6): runs every (Policy, TaskSet) pairing
//! for a bounded wall-clock budget and reports PASS/FAIL. Out of core
//! scope per spec.md §1 ("the top-level program that registers hard-coded
//! task sets and iterates policy×set combinations"), but implemented here
//! since the crate must actually run end to end.

use std::sync::Arc;
use std::time::Instant;

use crate::config::HarnessConfig;
use crate::error::HarnessError;
use crate::policy::PolicyKind;
use crate::scheduler::Scheduler;
use crate::task_set::TaskSet;
use crate::trace::TracingSink;

/// What happened to one (policy, task set) pairing.
#[derive(Debug)]
pub enum Outcome {
    Pass,
    Fail,
    /// Thread-create or synchronization-primitive failure — fatal to this
    /// pair only (spec.md §7), reported alongside PASS/FAIL as FAIL.
    Aborted(HarnessError),
}

#[derive(Debug)]
pub struct PairResult {
    pub algo_index: usize,
    pub algo_name: &'static str,
    pub set_index: usize,
    pub outcome: Outcome,
}

impl PairResult {
    /// spec.md §6: `[ ALGO <a> TEST SET <s> PASS ]` / `[ ... FAIL ]`.
    pub fn format_line(&self) -> String {
        let verdict = match self.outcome {
            Outcome::Pass => "PASS",
            Outcome::Fail | Outcome::Aborted(_) => "FAIL",
        };
        format!(
            "[ ALGO {} TEST SET {} {} ]",
            self.algo_index, self.set_index, verdict
        )
    }
}

pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    pub fn new(config: HarnessConfig) -> Self {
        Self { config }
    }

    /// Run every (policy, set) pairing and collect results. Policies
    /// outer, sets inner, matching the `[ ALGO a TEST SET s ... ]` output
    /// grammar's enumeration order.
    pub fn run_all(&self) -> Vec<PairResult> {
        let mut results = Vec::new();
        for (algo_index, policy_kind) in self.config.policies.iter().enumerate() {
            for (set_index, set) in self.config.task_sets.iter().enumerate() {
                let outcome = self.run_pair(*policy_kind, set, algo_index as u32);
                results.push(PairResult {
                    algo_index,
                    algo_name: policy_kind.name(),
                    set_index,
                    outcome,
                });
            }
        }
        results
    }

    fn run_pair(&self, policy_kind: PolicyKind, set: &TaskSet, algo_index: u32) -> Outcome {
        tracing::info!(
            policy = policy_kind.name(),
            set_id = set.id(),
            "starting (policy, set) pairing"
        );

        let trace = Arc::new(TracingSink::new(set.tasks().len() as u32));
        let mut scheduler = Scheduler::new(policy_kind.build(), trace, algo_index);
        for task in set.tasks() {
            scheduler.add_task(task.clone());
        }

        if let Err(err) = scheduler.init() {
            let _ = scheduler.halt();
            return Outcome::Aborted(err);
        }

        let start = Instant::now();
        let mut outcome = Outcome::Pass;
        loop {
            scheduler.schedule();
            if !scheduler.is_schedulable() {
                outcome = Outcome::Fail;
                break;
            }
            if start.elapsed() >= self.config.wall_clock_budget {
                break;
            }
            scheduler.run();
        }

        if let Err(err) = scheduler.halt() {
            return Outcome::Aborted(err);
        }
        outcome
    }
}

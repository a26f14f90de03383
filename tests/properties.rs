//! Property-based tests (SPEC_FULL.md §8 "ADDED") covering the recurrence
//! invariants from spec.md §8 across randomized `(C,P,D)` tuples and tick
//! counts. These drive `Policy::recalc` directly against synthetic ready-task
//! selections rather than spinning real worker threads — the arithmetic
//! under test is the recurrence, not the OS scheduling side effects.

use std::sync::Arc;

use proptest::prelude::*;

use qnx_rtsched::policy::PolicyKind;
use qnx_rtsched::task::Task;

/// A `(C, P, D)` triple satisfying the Task invariants `C >= 1`, `D >= C`,
/// `P >= D`, each bounded well under `u32::MAX / 4` so addition with other
/// such values never approaches `i64` overflow.
fn ctuple_strategy() -> impl Strategy<Value = (u32, u32, u32)> {
    (1u32..500, 0u32..500, 0u32..500).prop_map(|(c, extra_d, extra_p)| {
        let d = c + extra_d;
        let p = d + extra_p;
        (c, p, d)
    })
}

fn task_sets_strategy() -> impl Strategy<Value = Vec<(u32, u32, u32)>> {
    prop::collection::vec(ctuple_strategy(), 1..5)
}

fn pick_head<'a>(policy: &dyn qnx_rtsched::policy::Policy, tasks: &'a [Arc<Task>]) -> Option<&'a Arc<Task>> {
    tasks
        .iter()
        .filter(|t| t.is_ready())
        .min_by_key(|t| policy.ordering_key(t))
}

proptest! {
    /// spec.md §8: "For every Task at every tick boundary: 0 <= a <= C."
    #[test]
    fn a_stays_within_c_across_ticks(
        params in task_sets_strategy(),
        policy_kind in prop_oneof![Just(PolicyKind::Rma), Just(PolicyKind::Edf), Just(PolicyKind::Sct)],
        n_ticks in 1usize..50,
    ) {
        let policy = policy_kind.build();
        let tasks: Vec<Arc<Task>> = params
            .iter()
            .enumerate()
            .map(|(i, &(c, p, d))| Arc::new(Task::new(i as u32, c, p, d).unwrap()))
            .collect();

        for _ in 0..n_ticks {
            let head = pick_head(policy.as_ref(), &tasks).cloned();
            policy.recalc(&tasks, head.as_ref());

            for t in &tasks {
                prop_assert!(t.a() <= t.c(), "a={} exceeded C={} for task {}", t.a(), t.c(), t.id());
            }
        }
    }

    /// spec.md §8: "the sum Σ Δᵢ applied across Tasks equals the
    /// elapsed-quanta value Δ for the tick" — every non-head task's `r`
    /// moves by the same Δ, and that Δ is exactly `head.C` under RMA, the
    /// policy period under EDF/SCT, or `min r` on an idle tick.
    #[test]
    fn recalc_applies_one_uniform_delta_to_every_non_head_task(
        params in task_sets_strategy(),
        policy_kind in prop_oneof![Just(PolicyKind::Rma), Just(PolicyKind::Edf), Just(PolicyKind::Sct)],
    ) {
        let policy = policy_kind.build();
        let tasks: Vec<Arc<Task>> = params
            .iter()
            .enumerate()
            .map(|(i, &(c, p, d))| Arc::new(Task::new(i as u32, c, p, d).unwrap()))
            .collect();

        let head = pick_head(policy.as_ref(), &tasks).cloned();
        let r_before: Vec<i64> = tasks.iter().map(|t| t.r()).collect();

        let expected_delta = match &head {
            Some(h) => match policy_kind {
                PolicyKind::Rma => h.c() as i64,
                PolicyKind::Edf | PolicyKind::Sct => 1,
            },
            None => tasks.iter().map(|t| t.r()).min().unwrap_or(0),
        };

        policy.recalc(&tasks, head.as_ref());

        for (i, t) in tasks.iter().enumerate() {
            let is_head = head.as_ref().is_some_and(|h| h.id() == t.id());
            if !is_head {
                prop_assert_eq!(
                    t.r(),
                    r_before[i] - expected_delta,
                    "task {} did not move by the uniform delta {}",
                    t.id(),
                    expected_delta
                );
            }
        }
    }

    /// spec.md §8 boundary behavior: `remaining_time`/`completion_time`
    /// never panic on overflow for `C,P,D` up to `u32::MAX / 4`.
    #[test]
    fn completion_and_remaining_time_never_overflow(
        c in 1u32..(u32::MAX / 4),
        extra_d in 0u32..(u32::MAX / 8),
        extra_p in 0u32..(u32::MAX / 8),
        r in i64::MIN / 4..i64::MAX / 4,
    ) {
        let d = c.saturating_add(extra_d);
        let p = d.saturating_add(extra_p);
        let task = Task::new(0, c, p, d).unwrap();
        task.set_r(r);

        let _ = task.completion_time();
        let _ = task.remaining_time();
    }

    /// spec.md §8 round-trip property: `start` always resets `a=0, r=0`
    /// regardless of prior state, so a Task is reusable across runs.
    #[test]
    fn start_resets_state_regardless_of_prior_values(
        (c, p, d) in ctuple_strategy(),
        prior_a in 0u32..1000,
        prior_r in -1000i64..1000,
    ) {
        let task = Arc::new(Task::new(0, c, p, d).unwrap());
        task.set_a(prior_a.min(c));
        task.set_r(prior_r);

        task.start(qnx_rtsched::posix::KernelPolicy::Fifo, 7).unwrap();
        prop_assert_eq!(task.a(), 0);
        prop_assert_eq!(task.r(), 0);
        task.stop().unwrap();
    }
}

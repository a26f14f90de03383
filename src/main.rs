//! Binary entry point: calibrate the host clock, register the seed task
//! sets against all three policies, run them, and print
//! `[ ALGO a TEST SET s PASS|FAIL ]` for each pairing (spec.md §6, §8).

use tracing_subscriber::EnvFilter;

use qnx_rtsched::config::HarnessConfig;
use qnx_rtsched::policy::PolicyKind;
use qnx_rtsched::task_set::TaskSet;
use qnx_rtsched::timing::calibrate;
use qnx_rtsched::{Harness, Outcome};

/// The seed task sets from spec.md §8, in registration order.
fn seed_task_sets() -> Vec<TaskSet> {
    let specs: Vec<Vec<(u32, u32, u32)>> = vec![
        vec![(1, 5, 5)],
        vec![(1, 7, 7), (2, 5, 5), (1, 8, 8), (1, 10, 10), (2, 16, 16)],
        vec![(1, 3, 3), (2, 5, 5), (1, 10, 10)],
        vec![(5, 6, 6), (5, 6, 6)],
        vec![(1, 100, 100)],
        vec![(10, 20, 20), (1, 5, 5)],
    ];

    specs
        .into_iter()
        .enumerate()
        .map(|(id, params)| {
            TaskSet::new(id as u32, params).expect("seed task sets are well-formed by construction")
        })
        .collect()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    if let Err(err) = calibrate() {
        tracing::error!(error = %err, "timing calibration failed, aborting");
        std::process::exit(1);
    }

    let config = HarnessConfig::new(
        seed_task_sets(),
        vec![PolicyKind::Rma, PolicyKind::Edf, PolicyKind::Sct],
    );
    let harness = Harness::new(config);

    let mut any_fail = false;
    for result in harness.run_all() {
        println!("{}", result.format_line());
        if matches!(result.outcome, Outcome::Fail | Outcome::Aborted(_)) {
            any_fail = true;
        }
    }

    // spec.md §6: the driver always reports results and exits 0 — PASS/FAIL
    // is conveyed in the printed line, not the process exit code.
    let _ = any_fail;
    std::process::exit(0);
}

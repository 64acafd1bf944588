//! Test: Idempotent re-run - satisfied steps are skipped

use crate::helpers::*;
use provisor::core::state::{RunState, StepStatus};
use provisor::core::step::{Classification, Directive, Probe, Step};
use std::sync::Arc;

/// When every probe reports satisfied, nothing executes and the run
/// completes with all steps skipped.
#[tokio::test]
async fn test_fully_satisfied_host_skips_everything() {
    let runner = Arc::new(MockRunner::new());
    runner.satisfy_probe("check a").await;
    runner.satisfy_probe("check b").await;

    let steps = vec![
        step("a", &[], Classification::Fatal),
        step("b", &["a"], Classification::Fatal),
    ];
    let run = execute_steps(steps, runner.clone()).await;

    assert_run_state(&run, RunState::Completed);
    assert_step_status(&run, "a", StepStatus::Skipped);
    assert_step_status(&run, "b", StepStatus::Skipped);
    assert!(runner.executed().await.is_empty());
}

/// A partially provisioned host re-runs only the unsatisfied steps.
#[tokio::test]
async fn test_partial_host_runs_only_missing_steps() {
    let runner = Arc::new(MockRunner::new());
    runner.satisfy_probe("check a").await;

    let steps = vec![
        step("a", &[], Classification::Fatal),
        step("b", &["a"], Classification::Fatal),
    ];
    let run = execute_steps(steps, runner.clone()).await;

    assert_run_state(&run, RunState::Completed);
    assert_step_status(&run, "a", StepStatus::Skipped);
    assert_step_status(&run, "b", StepStatus::Success);
    assert_eq!(runner.executed().await, vec!["do b"]);
}

fn probe_step(id: &str, probe: Probe) -> Step {
    Step {
        id: id.to_string(),
        summary: format!("{} step", id),
        depends_on: vec![],
        classification: Classification::Fatal,
        probe,
        action: vec![Directive::Run {
            command: format!("do {}", id),
        }],
    }
}

/// Every probe kind can short-circuit its step.
#[tokio::test]
async fn test_each_probe_kind_skips_when_satisfied() {
    let runner = Arc::new(MockRunner::new());
    runner.probe_stdout("node --version", "v20.11.1").await;
    runner.add_path("/opt/app/.git").await;
    runner
        .add_file("/opt/app/.env", "PUBLIC_DOMAIN=vpn.example.com\n")
        .await;

    let steps = vec![
        probe_step(
            "runtime",
            Probe::CommandOutputContains {
                command: "node --version".to_string(),
                needle: "v20".to_string(),
            },
        ),
        probe_step(
            "fetch",
            Probe::PathExists {
                path: "/opt/app/.git".to_string(),
            },
        ),
        probe_step(
            "environment",
            Probe::FileContains {
                path: "/opt/app/.env".to_string(),
                needle: "PUBLIC_DOMAIN=vpn.example.com".to_string(),
            },
        ),
    ];

    let run = execute_steps(steps, runner.clone()).await;

    assert_run_state(&run, RunState::Completed);
    for id in ["runtime", "fetch", "environment"] {
        assert_step_status(&run, id, StepStatus::Skipped);
    }
    assert!(runner.executed().await.is_empty());
}

/// Unsatisfied output probes run their step: the command output is there
/// but missing the needle.
#[tokio::test]
async fn test_output_probe_mismatch_runs_step() {
    let runner = Arc::new(MockRunner::new());
    runner.probe_stdout("node --version", "v18.19.0").await;

    let steps = vec![probe_step(
        "runtime",
        Probe::CommandOutputContains {
            command: "node --version".to_string(),
            needle: "v20".to_string(),
        },
    )];
    let run = execute_steps(steps, runner.clone()).await;

    assert_step_status(&run, "runtime", StepStatus::Success);
    assert_eq!(runner.executed().await, vec!["do runtime"]);
}

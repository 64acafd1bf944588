//! Test: Fatal failure - abort with dependent poisoning

use crate::helpers::*;
use provisor::core::state::{RunState, StepStatus};
use provisor::core::step::Classification;
use provisor::status::{LogLevel, StatusBoard};
use std::sync::Arc;

/// A failed fatal step aborts the run and leaves its dependents pending,
/// while steps outside that subtree still execute.
#[tokio::test]
async fn test_fatal_failure_aborts_and_poisons_dependents() {
    let runner = Arc::new(MockRunner::new());
    runner.fail_command("do a", "disk full").await;

    let steps = vec![
        step("a", &[], Classification::Fatal),
        step("b", &["a"], Classification::Fatal),
        step("c", &[], Classification::WarnOnly),
    ];

    let run = execute_steps(steps, runner.clone()).await;

    assert_run_state(&run, RunState::Aborted);
    assert_step_status(&run, "a", StepStatus::Failed);
    assert_step_status(&run, "b", StepStatus::Pending);
    assert_step_status(&run, "c", StepStatus::Success);

    // b never reached the host
    assert_eq!(runner.executed().await, vec!["do a", "do c"]);

    let error = run.step("a").unwrap().last_error.clone().unwrap();
    assert!(error.contains("disk full"));
}

/// Transitive dependents of a failed fatal step stay pending too.
#[tokio::test]
async fn test_fatal_failure_poisons_transitively() {
    let runner = Arc::new(MockRunner::new());
    runner.fail_command("do a", "boom").await;

    let steps = vec![
        step("a", &[], Classification::Fatal),
        step("b", &["a"], Classification::Fatal),
        step("c", &["b"], Classification::Fatal),
    ];

    let run = execute_steps(steps, runner.clone()).await;

    assert_run_state(&run, RunState::Aborted);
    assert_step_status(&run, "b", StepStatus::Pending);
    assert_step_status(&run, "c", StepStatus::Pending);
    assert_eq!(runner.executed().await, vec!["do a"]);
}

/// The failure lands in the log buffer attached to the failing step.
#[tokio::test]
async fn test_fatal_failure_logged_with_step_id() {
    let runner = Arc::new(MockRunner::new());
    runner.fail_command("do a", "boom").await;

    let board = Arc::new(StatusBoard::new(100));
    let run = execute_steps_with_board(
        vec![step("a", &[], Classification::Fatal)],
        runner,
        board.clone(),
    )
    .await;

    assert_run_state(&run, RunState::Aborted);

    let (logs, _) = board.logs_since(None).await;
    let failure = logs
        .iter()
        .find(|entry| entry.level == LogLevel::Error && entry.step_id.as_deref() == Some("a"))
        .expect("failure should be logged against the step");
    assert!(failure.message.contains("boom"));
}

//! Test: Operator interrupt - halt between steps

use crate::helpers::*;
use provisor::core::state::{RunState, StepStatus};
use provisor::core::step::Classification;
use provisor::core::Plan;
use provisor::execution::{ExecutionEngine, ExecutionEvent};
use provisor::status::StatusBoard;
use std::sync::atomic::Ordering;
use std::sync::Arc;

/// Raising the halt flag lets the step in flight finish, then stops the run.
#[tokio::test]
async fn test_halt_stops_after_current_step() {
    let runner = Arc::new(MockRunner::new());
    let plan = Plan::new(vec![
        step("a", &[], Classification::Fatal),
        step("b", &["a"], Classification::Fatal),
    ])
    .unwrap();

    let board = Arc::new(StatusBoard::new(100));
    let mut engine = ExecutionEngine::new(runner.clone(), board);

    // request the halt as soon as the first step succeeds
    let halt = engine.halt_flag();
    engine.add_event_handler(move |event| {
        if matches!(event, ExecutionEvent::StepSucceeded { .. }) {
            halt.store(true, Ordering::SeqCst);
        }
    });

    let run = engine
        .execute(&plan, &test_settings(), &test_configuration())
        .await;

    assert_run_state(&run, RunState::Aborted);
    assert_step_status(&run, "a", StepStatus::Success);
    assert_step_status(&run, "b", StepStatus::Pending);
    assert_eq!(runner.executed().await, vec!["do a"]);
}

/// A halt raised during the last step leaves nothing pending, so the run
/// still counts as completed.
#[tokio::test]
async fn test_halt_after_last_step_still_completes() {
    let runner = Arc::new(MockRunner::new());
    let plan = Plan::new(vec![step("a", &[], Classification::Fatal)]).unwrap();

    let board = Arc::new(StatusBoard::new(100));
    let mut engine = ExecutionEngine::new(runner, board);

    let halt = engine.halt_flag();
    engine.add_event_handler(move |event| {
        if matches!(event, ExecutionEvent::StepSucceeded { .. }) {
            halt.store(true, Ordering::SeqCst);
        }
    });

    let run = engine
        .execute(&plan, &test_settings(), &test_configuration())
        .await;

    assert_run_state(&run, RunState::Completed);
    assert_step_status(&run, "a", StepStatus::Success);
}

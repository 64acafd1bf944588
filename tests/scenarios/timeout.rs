//! Test: Step timeout - slow steps fail within the configured bound

use crate::helpers::*;
use async_trait::async_trait;
use provisor::core::state::{RunState, StepStatus};
use provisor::core::step::Classification;
use provisor::core::Plan;
use provisor::error::Result;
use provisor::execution::{CommandOutput, CommandRunner, ExecutionEngine};
use provisor::status::StatusBoard;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

/// Host double whose commands take longer than the configured timeout.
struct SlowRunner;

#[async_trait]
impl CommandRunner for SlowRunner {
    async fn run(&self, _command: &str) -> Result<CommandOutput> {
        tokio::time::sleep(Duration::from_millis(200)).await;
        Ok(CommandOutput::ok())
    }

    async fn probe(&self, _command: &str) -> Result<CommandOutput> {
        Ok(CommandOutput::failed("unsatisfied"))
    }

    async fn write_file(&self, _path: &Path, _contents: &str) -> Result<()> {
        Ok(())
    }

    async fn path_exists(&self, _path: &Path) -> bool {
        false
    }

    async fn read_file(&self, _path: &Path) -> Result<String> {
        Err(std::io::Error::new(std::io::ErrorKind::NotFound, "slow host").into())
    }
}

/// A fatal step that exceeds the step timeout fails and aborts the run.
#[tokio::test]
async fn test_slow_fatal_step_times_out() {
    let plan = Plan::new(vec![step("a", &[], Classification::Fatal)]).unwrap();
    let board = Arc::new(StatusBoard::new(100));

    let engine =
        ExecutionEngine::new(SlowRunner, board).with_step_timeout(Duration::from_millis(50));
    let run = engine
        .execute(&plan, &test_settings(), &test_configuration())
        .await;

    assert_run_state(&run, RunState::Aborted);
    assert_step_status(&run, "a", StepStatus::Failed);
    let error = run.step("a").unwrap().last_error.clone().unwrap();
    assert!(error.contains("timed out"));
}

/// A warn-only step that times out fails without aborting the run.
#[tokio::test]
async fn test_slow_warn_only_step_fails_without_abort() {
    let plan = Plan::new(vec![step("slow", &[], Classification::WarnOnly)]).unwrap();
    let board = Arc::new(StatusBoard::new(100));

    let engine =
        ExecutionEngine::new(SlowRunner, board).with_step_timeout(Duration::from_millis(50));
    let run = engine
        .execute(&plan, &test_settings(), &test_configuration())
        .await;

    assert_run_state(&run, RunState::Completed);
    assert_step_status(&run, "slow", StepStatus::Failed);
}

/// Without a configured timeout, slow steps are allowed to finish.
#[tokio::test]
async fn test_no_timeout_lets_slow_step_finish() {
    let plan = Plan::new(vec![step("a", &[], Classification::Fatal)]).unwrap();
    let board = Arc::new(StatusBoard::new(100));

    let engine = ExecutionEngine::new(SlowRunner, board);
    let run = engine
        .execute(&plan, &test_settings(), &test_configuration())
        .await;

    assert_run_state(&run, RunState::Completed);
    assert_step_status(&run, "a", StepStatus::Success);
}

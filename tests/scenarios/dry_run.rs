//! Test: Dry run - full catalog walk without touching the host

use crate::helpers::*;
use provisor::core::state::{RunState, StepStatus};
use provisor::core::{catalog, Plan};
use provisor::execution::{ExecutionEngine, RecordingRunner};
use provisor::status::StatusBoard;
use std::sync::Arc;

/// A dry run visits every built-in step, recording commands instead of
/// executing them.
#[tokio::test]
async fn test_dry_run_walks_the_full_catalog() {
    let settings = test_settings();
    let config = test_configuration();
    let plan = Plan::new(catalog::builtin_steps(&settings, &config)).unwrap();
    let total = plan.len();

    let runner = Arc::new(RecordingRunner::new());
    let board = Arc::new(StatusBoard::new(100));
    let engine = ExecutionEngine::new(runner.clone(), board);

    let run = engine.execute(&plan, &settings, &config).await;

    assert_run_state(&run, RunState::Completed);
    assert_eq!(run.steps.len(), total);
    assert!(run.steps.iter().all(|s| s.status == StepStatus::Success));

    let commands = runner.commands().await;
    assert!(commands.iter().any(|c| c.contains("apt-get install")));
    assert!(commands.iter().any(|c| c.contains("pm2")));
    assert!(commands.iter().any(|c| c.contains("git clone")));
}

/// Dry runs record rendered artifacts with every placeholder resolved.
#[tokio::test]
async fn test_dry_run_records_rendered_artifacts() {
    let settings = test_settings();
    let config = test_configuration();
    let plan = Plan::new(catalog::builtin_steps(&settings, &config)).unwrap();

    let runner = Arc::new(RecordingRunner::new());
    let board = Arc::new(StatusBoard::new(100));
    let engine = ExecutionEngine::new(runner.clone(), board);
    engine.execute(&plan, &settings, &config).await;

    let writes = runner.writes().await;
    assert!(!writes.is_empty());

    let env = writes
        .iter()
        .find(|(path, _)| path.to_string_lossy().ends_with(".env"))
        .expect("dry run should record the environment file");
    assert!(env.1.contains("PUBLIC_DOMAIN=vpn.example.com"));

    // no unresolved placeholders in any rendered artifact
    for (path, contents) in &writes {
        assert!(
            !contents.contains("{{"),
            "unresolved placeholder in {}",
            path.display()
        );
    }
}

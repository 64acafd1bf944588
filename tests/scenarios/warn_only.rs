//! Test: Warn-only failure - run continues to completion

use crate::helpers::*;
use provisor::core::state::{RunState, StepStatus};
use provisor::core::step::{Artifact, Classification, Directive, Probe, Step};
use std::path::PathBuf;
use std::sync::Arc;

/// A warn-only failure does not stop the run or block later steps.
#[tokio::test]
async fn test_warn_only_failure_keeps_run_going() {
    let runner = Arc::new(MockRunner::new());
    runner.fail_command("do firewall", "ufw not found").await;

    let steps = vec![
        step("firewall", &[], Classification::WarnOnly),
        step("after", &["firewall"], Classification::Fatal),
    ];

    let run = execute_steps(steps, runner.clone()).await;

    assert_run_state(&run, RunState::Completed);
    assert_step_status(&run, "firewall", StepStatus::Failed);
    assert_step_status(&run, "after", StepStatus::Success);
    assert_eq!(runner.executed().await, vec!["do firewall", "do after"]);
}

/// Multiple warn-only failures still leave the run completed.
#[tokio::test]
async fn test_all_warn_only_failures_complete() {
    let runner = Arc::new(MockRunner::new());
    runner.fail_command("do firewall", "ufw missing").await;
    runner.fail_command("do certificate", "rate limited").await;

    let steps = vec![
        step("firewall", &[], Classification::WarnOnly),
        step("certificate", &[], Classification::WarnOnly),
    ];

    let run = execute_steps(steps, runner).await;

    assert_run_state(&run, RunState::Completed);
    assert_step_status(&run, "firewall", StepStatus::Failed);
    assert_step_status(&run, "certificate", StepStatus::Failed);
}

/// Artifacts still render and write after an unrelated warn-only failure.
#[tokio::test]
async fn test_render_proceeds_after_warn_only_failure() {
    let runner = Arc::new(MockRunner::new());
    runner.fail_command("do certificate", "rate limited").await;

    let render_step = Step {
        id: "write-environment".to_string(),
        summary: "Write application environment file".to_string(),
        depends_on: vec![],
        classification: Classification::Fatal,
        probe: Probe::PathExists {
            path: "/opt/app/.env".to_string(),
        },
        action: vec![Directive::Render {
            artifact: Artifact::EnvFile,
            dest: "/opt/app/.env".to_string(),
        }],
    };

    let steps = vec![
        step("certificate", &[], Classification::WarnOnly),
        render_step,
    ];
    let run = execute_steps(steps, runner.clone()).await;

    assert_run_state(&run, RunState::Completed);
    assert_step_status(&run, "write-environment", StepStatus::Success);

    let writes = runner.writes().await;
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].0, PathBuf::from("/opt/app/.env"));
    assert!(writes[0].1.contains("PUBLIC_DOMAIN=vpn.example.com"));
}

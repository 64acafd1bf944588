//! Test utility functions for provisor

use provisor::core::{
    state::{DeploymentRun, RunState, StepStatus},
    step::{Classification, Directive, Probe, Step},
    Configuration, Plan, Settings,
};
use provisor::execution::{CommandOutput, CommandRunner, ExecutionEngine};
use provisor::status::StatusBoard;

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Scriptable host double that records every command it executes
///
/// Probes read unsatisfied and paths read absent unless scripted otherwise,
/// so a plan run against a fresh mock behaves like a run against a bare host.
#[derive(Default)]
pub struct MockRunner {
    responses: Mutex<HashMap<String, CommandOutput>>,
    probe_responses: Mutex<HashMap<String, CommandOutput>>,
    existing_paths: Mutex<HashSet<PathBuf>>,
    files: Mutex<HashMap<PathBuf, String>>,
    executed: Mutex<Vec<String>>,
    writes: Mutex<Vec<(PathBuf, String)>>,
}

impl MockRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script the output of an action command.
    pub async fn respond(&self, command: &str, output: CommandOutput) {
        self.responses
            .lock()
            .await
            .insert(command.to_string(), output);
    }

    /// Script an action command to exit non-zero.
    pub async fn fail_command(&self, command: &str, stderr: &str) {
        self.respond(command, CommandOutput::failed(stderr)).await;
    }

    /// Script a probe command as satisfied.
    pub async fn satisfy_probe(&self, command: &str) {
        self.probe_responses
            .lock()
            .await
            .insert(command.to_string(), CommandOutput::ok());
    }

    /// Script a probe command's stdout, for output-matching probes.
    pub async fn probe_stdout(&self, command: &str, stdout: &str) {
        self.probe_responses
            .lock()
            .await
            .insert(command.to_string(), CommandOutput::with_stdout(stdout));
    }

    /// Mark a path as existing on the mock host.
    pub async fn add_path(&self, path: &str) {
        self.existing_paths.lock().await.insert(PathBuf::from(path));
    }

    /// Place a file with contents on the mock host.
    pub async fn add_file(&self, path: &str, contents: &str) {
        let path = PathBuf::from(path);
        self.existing_paths.lock().await.insert(path.clone());
        self.files.lock().await.insert(path, contents.to_string());
    }

    /// Action commands executed, in order. Probes are not included.
    pub async fn executed(&self) -> Vec<String> {
        self.executed.lock().await.clone()
    }

    /// Files written through the runner, in order.
    pub async fn writes(&self) -> Vec<(PathBuf, String)> {
        self.writes.lock().await.clone()
    }
}

#[async_trait]
impl CommandRunner for MockRunner {
    async fn run(&self, command: &str) -> provisor::Result<CommandOutput> {
        self.executed.lock().await.push(command.to_string());
        let scripted = self.responses.lock().await.get(command).cloned();
        Ok(scripted.unwrap_or_else(CommandOutput::ok))
    }

    async fn probe(&self, command: &str) -> provisor::Result<CommandOutput> {
        let scripted = self.probe_responses.lock().await.get(command).cloned();
        Ok(scripted.unwrap_or_else(|| CommandOutput::failed("unsatisfied")))
    }

    async fn write_file(&self, path: &Path, contents: &str) -> provisor::Result<()> {
        self.writes
            .lock()
            .await
            .push((path.to_path_buf(), contents.to_string()));
        self.existing_paths.lock().await.insert(path.to_path_buf());
        self.files
            .lock()
            .await
            .insert(path.to_path_buf(), contents.to_string());
        Ok(())
    }

    async fn path_exists(&self, path: &Path) -> bool {
        self.existing_paths.lock().await.contains(path)
    }

    async fn read_file(&self, path: &Path) -> provisor::Result<String> {
        match self.files.lock().await.get(path) {
            Some(contents) => Ok(contents.clone()),
            None => Err(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                path.display().to_string(),
            )
            .into()),
        }
    }
}

/// Build a step whose probe is `check <id>` and whose action is `do <id>`.
pub fn step(id: &str, deps: &[&str], classification: Classification) -> Step {
    Step {
        id: id.to_string(),
        summary: format!("{} step", id),
        depends_on: deps.iter().map(|s| s.to_string()).collect(),
        classification,
        probe: Probe::CommandOk {
            command: format!("check {}", id),
        },
        action: vec![Directive::Run {
            command: format!("do {}", id),
        }],
    }
}

pub fn test_settings() -> Settings {
    Settings::default()
}

pub fn test_configuration() -> Configuration {
    Configuration::assemble(
        "vpn.example.com".to_string(),
        "admin_1".to_string(),
        "admin@vpn.example.com".to_string(),
        "Secret123".to_string(),
    )
}

/// Run steps against a mock host and return the finished run.
pub async fn execute_steps(steps: Vec<Step>, runner: Arc<MockRunner>) -> DeploymentRun {
    let board = Arc::new(StatusBoard::new(100));
    execute_steps_with_board(steps, runner, board).await
}

/// Same as `execute_steps` with a caller-owned board, for asserting on the
/// published snapshots and logs.
pub async fn execute_steps_with_board(
    steps: Vec<Step>,
    runner: Arc<MockRunner>,
    board: Arc<StatusBoard>,
) -> DeploymentRun {
    let plan = Plan::new(steps).expect("test plan should be valid");
    let engine = ExecutionEngine::new(runner, board);
    engine
        .execute(&plan, &test_settings(), &test_configuration())
        .await
}

/// Assert a step reached the expected status.
pub fn assert_step_status(run: &DeploymentRun, step_id: &str, expected: StepStatus) {
    let state = run
        .step(step_id)
        .unwrap_or_else(|| panic!("Step '{}' not found in run", step_id));

    assert_eq!(
        state.status, expected,
        "Step '{}' should be {:?}, but was {:?} (last_error: {:?})",
        step_id, expected, state.status, state.last_error
    );
}

/// Assert the run reached the expected final state.
pub fn assert_run_state(run: &DeploymentRun, expected: RunState) {
    assert_eq!(
        run.state, expected,
        "Run should be {:?}, but was {:?}",
        expected, run.state
    );
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_runner_defaults_to_bare_host() {
        let runner = MockRunner::new();

        let action = runner.run("do a").await.unwrap();
        assert!(action.success);
        let probe = runner.probe("check a").await.unwrap();
        assert!(!probe.success);
        assert!(!runner.path_exists(Path::new("/opt/app")).await);

        assert_eq!(runner.executed().await, vec!["do a"]);
    }

    #[tokio::test]
    async fn test_mock_runner_scripting() {
        let runner = MockRunner::new();
        runner.fail_command("do a", "boom").await;
        runner.satisfy_probe("check a").await;
        runner.add_file("/opt/app/.env", "PORT=3000").await;

        assert!(!runner.run("do a").await.unwrap().success);
        assert!(runner.probe("check a").await.unwrap().success);
        assert!(runner.path_exists(Path::new("/opt/app/.env")).await);
        assert_eq!(
            runner.read_file(Path::new("/opt/app/.env")).await.unwrap(),
            "PORT=3000"
        );
    }

    #[tokio::test]
    async fn test_execute_steps_runs_to_completion() {
        let runner = Arc::new(MockRunner::new());
        let steps = vec![
            step("a", &[], Classification::Fatal),
            step("b", &["a"], Classification::Fatal),
        ];

        let run = execute_steps(steps, runner.clone()).await;

        assert_run_state(&run, RunState::Completed);
        assert_step_status(&run, "a", StepStatus::Success);
        assert_step_status(&run, "b", StepStatus::Success);
        assert_eq!(runner.executed().await, vec!["do a", "do b"]);
    }
}

//! Run and step state machines
//!
//! `StepStatus` and `RunState` only ever move forward; there is no transition
//! back out of a terminal state. The serialized names are part of the status
//! API wire shape.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle of a single provisioning step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum StepStatus {
    /// Not reached yet
    Pending,

    /// Currently executing
    Running,

    /// Action completed
    Success,

    /// Action raised an error or exited non-zero
    Failed,

    /// Idempotency probe was already satisfied; nothing ran
    Skipped,
}

impl StepStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            StepStatus::Success | StepStatus::Failed | StepStatus::Skipped
        )
    }
}

/// Lifecycle of a whole provisioning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    NotStarted,
    InProgress,
    Completed,
    Aborted,
}

/// Observed state of one step, as reported on the status surface.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepState {
    /// Step identifier
    #[serde(rename = "id")]
    pub step_id: String,

    /// Current lifecycle position
    pub status: StepStatus,

    /// When execution started; stays unset for skipped steps
    pub started_at: Option<DateTime<Utc>>,

    /// When the step reached a terminal status
    pub finished_at: Option<DateTime<Utc>>,

    /// Captured cause of the most recent failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl StepState {
    pub fn pending(step_id: String) -> Self {
        Self {
            step_id,
            status: StepStatus::Pending,
            started_at: None,
            finished_at: None,
            last_error: None,
        }
    }

    pub fn start(&mut self) {
        self.status = StepStatus::Running;
        self.started_at = Some(Utc::now());
    }

    pub fn succeed(&mut self) {
        self.status = StepStatus::Success;
        self.finished_at = Some(Utc::now());
    }

    pub fn fail(&mut self, cause: String) {
        self.status = StepStatus::Failed;
        self.finished_at = Some(Utc::now());
        self.last_error = Some(cause);
    }

    pub fn skip(&mut self) {
        self.status = StepStatus::Skipped;
        self.finished_at = Some(Utc::now());
    }
}

/// One end-to-end provisioning run against a host.
///
/// Steps are kept in execution order; the engine publishes a full clone of
/// this struct to the status board after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeploymentRun {
    /// Unique run identifier
    pub run_id: Uuid,

    /// Current run lifecycle position
    pub state: RunState,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run reached a terminal state
    pub finished_at: Option<DateTime<Utc>>,

    /// Per-step state, in execution order
    pub steps: Vec<StepState>,
}

impl DeploymentRun {
    pub fn new(step_ids: Vec<String>) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            state: RunState::NotStarted,
            started_at: None,
            finished_at: None,
            steps: step_ids.into_iter().map(StepState::pending).collect(),
        }
    }

    pub fn start(&mut self) {
        self.state = RunState::InProgress;
        self.started_at = Some(Utc::now());
    }

    pub fn complete(&mut self) {
        self.state = RunState::Completed;
        self.finished_at = Some(Utc::now());
    }

    pub fn abort(&mut self) {
        self.state = RunState::Aborted;
        self.finished_at = Some(Utc::now());
    }

    pub fn step(&self, step_id: &str) -> Option<&StepState> {
        self.steps.iter().find(|s| s.step_id == step_id)
    }

    pub fn step_mut(&mut self, step_id: &str) -> Option<&mut StepState> {
        self.steps.iter_mut().find(|s| s.step_id == step_id)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, RunState::Completed | RunState::Aborted)
    }
}

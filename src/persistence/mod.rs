//! Persistence for run reports
//!
//! After a run finishes, a JSON report lands in the state directory: one file
//! keyed by run ID plus `report-latest.json` pointing at the most recent run.
//! Reports carry step outcomes and identity fields only. The admin password
//! and generated secrets never leave the configuration store.

use crate::core::config::Configuration;
use crate::core::state::{DeploymentRun, RunState, StepState};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Durable summary of a finished deployment run
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunReport {
    /// Unique run ID
    pub run_id: Uuid,

    /// Domain the host was provisioned for
    pub domain: String,

    /// Admin account created during the run
    pub admin_username: String,

    /// Final run state
    pub state: RunState,

    /// When the run started
    pub started_at: Option<DateTime<Utc>>,

    /// When the run finished
    pub finished_at: Option<DateTime<Utc>>,

    /// Per-step outcomes in execution order
    pub steps: Vec<StepState>,
}

impl RunReport {
    /// Build a report from a finished run and the configuration it ran with.
    pub fn from_run(run: &DeploymentRun, config: &Configuration) -> Self {
        Self {
            run_id: run.run_id,
            domain: config.domain.clone(),
            admin_username: config.admin_username.clone(),
            state: run.state,
            started_at: run.started_at,
            finished_at: run.finished_at,
            steps: run.steps.clone(),
        }
    }

    /// Write the report under `state_dir`, returning the run-specific path.
    pub fn save(&self, state_dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(state_dir)
            .with_context(|| format!("Failed to create state directory {}", state_dir.display()))?;

        let json = serde_json::to_string_pretty(self)?;
        let path = state_dir.join(format!("report-{}.json", self.run_id));
        std::fs::write(&path, &json)
            .with_context(|| format!("Failed to write report to {}", path.display()))?;
        std::fs::write(state_dir.join("report-latest.json"), &json)?;

        Ok(path)
    }

    /// Load the most recently saved report from `state_dir`.
    pub fn load_latest(state_dir: &Path) -> Result<Self> {
        let path = state_dir.join("report-latest.json");
        let json = std::fs::read_to_string(&path)
            .with_context(|| format!("no report at {}", path.display()))?;
        let report = serde_json::from_str(&json)
            .with_context(|| format!("Failed to parse report at {}", path.display()))?;
        Ok(report)
    }

    pub fn succeeded(&self) -> bool {
        self.state == RunState::Completed
    }
}

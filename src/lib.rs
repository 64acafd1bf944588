//! provisor - Single-host provisioning orchestrator with a pollable status API

pub mod api;
pub mod cli;
pub mod core;
pub mod error;
pub mod execution;
pub mod host;
pub mod persistence;
pub mod render;
pub mod secret;
pub mod status;
pub mod validate;

// Re-export commonly used types
pub use crate::core::{Configuration, DeploymentRun, Plan, RunState, Settings, Step, StepStatus};
pub use crate::error::{ProvisorError, Result};
pub use crate::execution::{CommandRunner, ExecutionEngine, ExecutionEvent, HostRunner};
pub use crate::status::StatusBoard;

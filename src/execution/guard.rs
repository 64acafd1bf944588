//! Idempotency probes
//!
//! A probe decides whether a step's work is already done. Probes never have
//! side effects, and a probe that cannot be evaluated degrades to
//! `NeedsExecution`: the step's own action must then be safe to repeat.

use crate::core::step::{Probe, Step};
use crate::execution::runner::CommandRunner;
use std::path::Path;
use tracing::debug;

/// Outcome of a precondition check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardVerdict {
    AlreadySatisfied,
    NeedsExecution,
}

/// Evaluate a step's probe against the host.
pub async fn check(step: &Step, runner: &dyn CommandRunner) -> GuardVerdict {
    let satisfied = match &step.probe {
        Probe::CommandOk { command } => match runner.probe(command).await {
            Ok(output) => output.success,
            Err(err) => {
                debug!(step = %step.id, error = %err, "Probe command could not run");
                false
            }
        },
        Probe::CommandOutputContains { command, needle } => match runner.probe(command).await {
            Ok(output) => output.success && output.stdout.contains(needle),
            Err(err) => {
                debug!(step = %step.id, error = %err, "Probe command could not run");
                false
            }
        },
        Probe::PathExists { path } => runner.path_exists(Path::new(path)).await,
        Probe::FileContains { path, needle } => match runner.read_file(Path::new(path)).await {
            Ok(text) => text.contains(needle),
            Err(_) => false,
        },
    };

    if satisfied {
        GuardVerdict::AlreadySatisfied
    } else {
        GuardVerdict::NeedsExecution
    }
}

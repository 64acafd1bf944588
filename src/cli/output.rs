//! CLI output formatting

use crate::core::state::{RunState, StepStatus};
use crate::execution::ExecutionEvent;
use crate::persistence::RunReport;
use console::Emoji;
use indicatif::{ProgressBar, ProgressStyle};
use std::time::Duration;

// Re-export style
pub use console::style;

// Emojis for output
pub static CHECK: Emoji<'_, '_> = Emoji("✅ ", "✓ ");
pub static CROSS: Emoji<'_, '_> = Emoji("❌ ", "✗ ");
pub static SPINNER: Emoji<'_, '_> = Emoji("⏳ ", "~ ");
pub static INFO: Emoji<'_, '_> = Emoji("ℹ️  ", "i ");
pub static WARN: Emoji<'_, '_> = Emoji("⚠️  ", "! ");
pub static ROCKET: Emoji<'_, '_> = Emoji("🚀 ", "> ");
pub static SKIP: Emoji<'_, '_> = Emoji("⏭️  ", "- ");

/// Create a progress bar
pub fn create_progress_bar(total: usize) -> ProgressBar {
    let progress = ProgressBar::new(total as u64);
    progress.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );
    progress.enable_steady_tick(Duration::from_millis(100));
    progress
}

/// Format a step status for display
pub fn format_step_status(status: StepStatus) -> String {
    match status {
        StepStatus::Pending => style("PENDING").dim().to_string(),
        StepStatus::Running => style("RUNNING").yellow().to_string(),
        StepStatus::Success => style("SUCCESS").green().to_string(),
        StepStatus::Failed => style("FAILED").red().to_string(),
        StepStatus::Skipped => style("SKIPPED").dim().to_string(),
    }
}

/// Format a run state for display
pub fn format_run_state(state: RunState) -> String {
    match state {
        RunState::NotStarted => style("NOT_STARTED").dim().to_string(),
        RunState::InProgress => style("IN_PROGRESS").yellow().to_string(),
        RunState::Completed => style("COMPLETED").green().to_string(),
        RunState::Aborted => style("ABORTED").red().to_string(),
    }
}

/// Format an execution event for display
pub fn format_execution_event(event: &ExecutionEvent) -> String {
    match event {
        ExecutionEvent::RunStarted {
            run_id,
            total_steps,
        } => format!(
            "{} Starting run {} ({} steps)",
            ROCKET,
            style(&run_id.to_string()[..8]).dim(),
            total_steps
        ),
        ExecutionEvent::StepStarted { step_id, summary } => {
            format!(
                "{} {} - {}",
                SPINNER,
                style(step_id).cyan(),
                style(summary).dim()
            )
        }
        ExecutionEvent::StepSkipped { step_id } => {
            format!(
                "{} {} {}",
                SKIP,
                style(step_id).dim(),
                style("(already satisfied)").dim()
            )
        }
        ExecutionEvent::StepSucceeded { step_id } => {
            format!("{} {}", CHECK, style(step_id).green())
        }
        ExecutionEvent::StepFailed {
            step_id,
            error,
            fatal,
        } => {
            if *fatal {
                format!("{} {}: {}", CROSS, style(step_id).red(), style(error).dim())
            } else {
                format!(
                    "{} {}: {} {}",
                    WARN,
                    style(step_id).yellow(),
                    style(error).dim(),
                    style("(continuing)").dim()
                )
            }
        }
        ExecutionEvent::RunFinished { run_id, state } => format!(
            "{} Run ({}) {}",
            INFO,
            style(&run_id.to_string()[..8]).dim(),
            format_run_state(*state)
        ),
    }
}

/// Format a run report for display
pub fn format_report(report: &RunReport) -> String {
    let mut lines = vec![format!(
        "{} Run {} for {} - {}",
        INFO,
        style(&report.run_id.to_string()[..8]).dim(),
        style(&report.domain).bold(),
        format_run_state(report.state)
    )];

    for step in &report.steps {
        let mut line = format!("  {} {}", format_step_status(step.status), step.step_id);
        if let Some(error) = &step.last_error {
            line.push_str(&format!(" - {}", style(error).dim()));
        }
        lines.push(line);
    }

    if let (Some(started), Some(finished)) = (report.started_at, report.finished_at) {
        let elapsed = finished.signed_duration_since(started);
        lines.push(format!(
            "  {} took {}s",
            style("elapsed:").dim(),
            elapsed.num_seconds()
        ));
    }

    lines.join("\n")
}

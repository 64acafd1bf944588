//! Main execution engine - walks the plan and drives each step
//!
//! The engine runs steps sequentially in plan order. Before each step it
//! consults the idempotency guard; after each state change it publishes a
//! fresh snapshot to the status board, so readers never observe a
//! half-updated run. A fatal failure aborts the run and poisons every
//! transitive dependent, but steps outside that subtree still execute.

use crate::{
    core::{
        config::Configuration,
        plan::Plan,
        settings::Settings,
        state::{DeploymentRun, RunState, StepStatus},
        step::{Directive, Step},
    },
    error::{ProvisorError, Result},
    execution::{
        guard::{self, GuardVerdict},
        runner::CommandRunner,
    },
    render,
    status::{LogLevel, StatusBoard},
};
use std::collections::HashSet;
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::time::{timeout, Duration};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Events that occur while a run executes.
#[derive(Debug, Clone)]
pub enum ExecutionEvent {
    RunStarted {
        run_id: Uuid,
        total_steps: usize,
    },
    StepStarted {
        step_id: String,
        summary: String,
    },
    StepSkipped {
        step_id: String,
    },
    StepSucceeded {
        step_id: String,
    },
    StepFailed {
        step_id: String,
        error: String,
        fatal: bool,
    },
    RunFinished {
        run_id: Uuid,
        state: RunState,
    },
}

/// Type for event handlers
pub type EventHandler = Arc<dyn Fn(ExecutionEvent) + Send + Sync>;

/// Sequential plan executor.
pub struct ExecutionEngine<R> {
    runner: R,
    board: Arc<StatusBoard>,
    halt: Arc<AtomicBool>,
    step_timeout: Option<Duration>,
    event_handlers: Vec<EventHandler>,
}

impl<R: CommandRunner> ExecutionEngine<R> {
    pub fn new(runner: R, board: Arc<StatusBoard>) -> Self {
        Self {
            runner,
            board,
            halt: Arc::new(AtomicBool::new(false)),
            step_timeout: None,
            event_handlers: Vec::new(),
        }
    }

    /// Apply a soft per-step timeout.
    pub fn with_step_timeout(mut self, limit: Duration) -> Self {
        self.step_timeout = Some(limit);
        self
    }

    /// Flag checked between steps; setting it stops the run after the step
    /// currently in flight.
    pub fn halt_flag(&self) -> Arc<AtomicBool> {
        self.halt.clone()
    }

    /// Register a handler for execution events.
    pub fn add_event_handler<F>(&mut self, handler: F)
    where
        F: Fn(ExecutionEvent) + Send + Sync + 'static,
    {
        self.event_handlers.push(Arc::new(handler));
    }

    fn emit(&self, event: ExecutionEvent) {
        for handler in &self.event_handlers {
            handler(event.clone());
        }
    }

    /// Execute the plan to completion and return the final run record.
    pub async fn execute(
        &self,
        plan: &Plan,
        settings: &Settings,
        config: &Configuration,
    ) -> DeploymentRun {
        let mut run = DeploymentRun::new(plan.step_ids());
        run.start();
        self.board.replace_run(run.clone()).await;
        self.board
            .append_log(
                LogLevel::Info,
                None,
                format!("run {} started with {} steps", run.run_id, plan.len()),
            )
            .await;
        self.emit(ExecutionEvent::RunStarted {
            run_id: run.run_id,
            total_steps: plan.len(),
        });
        info!(run_id = %run.run_id, steps = plan.len(), "Starting provisioning run");

        let mut poisoned: HashSet<String> = HashSet::new();
        let mut fatal_failure = false;

        for step in plan.execution_order() {
            if self.halt.load(Ordering::SeqCst) {
                warn!(step = %step.id, "Interrupt requested, stopping before step");
                self.board
                    .append_log(
                        LogLevel::Warning,
                        None,
                        "interrupted by operator; remaining steps not run".to_string(),
                    )
                    .await;
                break;
            }

            if poisoned.contains(&step.id) {
                debug!(step = %step.id, "Upstream fatal failure, leaving pending");
                continue;
            }

            if guard::check(step, &self.runner).await == GuardVerdict::AlreadySatisfied {
                if let Some(state) = run.step_mut(&step.id) {
                    state.skip();
                }
                self.board.replace_run(run.clone()).await;
                self.board
                    .append_log(
                        LogLevel::Info,
                        Some(&step.id),
                        "already satisfied, skipped".to_string(),
                    )
                    .await;
                self.emit(ExecutionEvent::StepSkipped {
                    step_id: step.id.clone(),
                });
                info!(step = %step.id, "Already satisfied, skipping");
                continue;
            }

            if let Some(state) = run.step_mut(&step.id) {
                state.start();
            }
            self.board.replace_run(run.clone()).await;
            self.board
                .append_log(LogLevel::Info, Some(&step.id), step.summary.clone())
                .await;
            self.emit(ExecutionEvent::StepStarted {
                step_id: step.id.clone(),
                summary: step.summary.clone(),
            });
            info!(step = %step.id, "Running step");

            match self.run_action(step, settings, config).await {
                Ok(()) => {
                    if let Some(state) = run.step_mut(&step.id) {
                        state.succeed();
                    }
                    self.board.replace_run(run.clone()).await;
                    self.board
                        .append_log(LogLevel::Info, Some(&step.id), "completed".to_string())
                        .await;
                    self.emit(ExecutionEvent::StepSucceeded {
                        step_id: step.id.clone(),
                    });
                    info!(step = %step.id, "Step completed");
                }
                Err(err) => {
                    let cause = err.to_string();
                    // a broken template is a programming error, fatal no
                    // matter how the step is classified
                    let fatal =
                        step.is_fatal() || matches!(err, ProvisorError::Template { .. });

                    if let Some(state) = run.step_mut(&step.id) {
                        state.fail(cause.clone());
                    }
                    self.board
                        .append_log(
                            LogLevel::Error,
                            Some(&step.id),
                            format!("failed: {}", cause),
                        )
                        .await;
                    self.emit(ExecutionEvent::StepFailed {
                        step_id: step.id.clone(),
                        error: cause.clone(),
                        fatal,
                    });

                    if fatal {
                        error!(step = %step.id, error = %cause, "Fatal step failed, aborting run");
                        fatal_failure = true;
                        run.state = RunState::Aborted;
                        poisoned.extend(plan.dependents_of(&step.id));
                        self.board
                            .append_log(
                                LogLevel::Error,
                                None,
                                format!("run aborted: step {} failed", step.id),
                            )
                            .await;
                    } else {
                        warn!(step = %step.id, error = %cause, "Step failed (warn-only), continuing");
                        self.board
                            .append_log(
                                LogLevel::Warning,
                                Some(&step.id),
                                "continuing despite failure".to_string(),
                            )
                            .await;
                    }
                    self.board.replace_run(run.clone()).await;
                }
            }
        }

        let interrupted = self.halt.load(Ordering::SeqCst)
            && run.steps.iter().any(|s| s.status == StepStatus::Pending);

        if fatal_failure || interrupted {
            run.abort();
        } else {
            run.complete();
        }
        self.board.replace_run(run.clone()).await;
        self.board
            .append_log(
                if run.state == RunState::Completed {
                    LogLevel::Info
                } else {
                    LogLevel::Error
                },
                None,
                format!("run {} finished: {:?}", run.run_id, run.state),
            )
            .await;
        self.emit(ExecutionEvent::RunFinished {
            run_id: run.run_id,
            state: run.state,
        });
        info!(run_id = %run.run_id, state = ?run.state, "Run finished");

        run
    }

    /// Run a step's action, bounded by the soft timeout when one is set.
    async fn run_action(
        &self,
        step: &Step,
        settings: &Settings,
        config: &Configuration,
    ) -> Result<()> {
        let work = self.perform_directives(step, settings, config);
        match self.step_timeout {
            Some(limit) => match timeout(limit, work).await {
                Ok(result) => result,
                Err(_) => Err(ProvisorError::StepExecution {
                    step_id: step.id.clone(),
                    cause: format!("timed out after {} seconds", limit.as_secs()),
                }),
            },
            None => work.await,
        }
    }

    async fn perform_directives(
        &self,
        step: &Step,
        settings: &Settings,
        config: &Configuration,
    ) -> Result<()> {
        for directive in &step.action {
            match directive {
                Directive::Run { command } => {
                    debug!(step = %step.id, command = %command, "Executing directive");
                    let output = self.runner.run(command).await.map_err(|err| {
                        ProvisorError::StepExecution {
                            step_id: step.id.clone(),
                            cause: err.to_string(),
                        }
                    })?;
                    if !output.success {
                        let detail = if output.stderr.trim().is_empty() {
                            output.stdout.trim().to_string()
                        } else {
                            output.stderr.trim().to_string()
                        };
                        return Err(ProvisorError::StepExecution {
                            step_id: step.id.clone(),
                            cause: format!("command failed: {}", detail),
                        });
                    }
                }
                Directive::Render { artifact, dest } => {
                    debug!(step = %step.id, dest = %dest, "Rendering artifact");
                    let text = render::render_artifact(*artifact, settings, config)?;
                    self.runner
                        .write_file(Path::new(dest), &text)
                        .await
                        .map_err(|err| ProvisorError::StepExecution {
                            step_id: step.id.clone(),
                            cause: err.to_string(),
                        })?;
                }
            }
        }
        Ok(())
    }
}

mod api;
mod cli;
mod core;
mod error;
mod execution;
mod host;
mod persistence;
mod render;
mod secret;
mod status;
mod validate;

use crate::core::catalog;
use crate::core::config::Configuration;
use crate::core::plan::Plan;
use crate::core::settings::Settings;
use crate::core::state::{DeploymentRun, RunState};
use crate::core::step::Artifact;

use anyhow::{Context, Result};
use api::ApiServer;
use cli::commands::{RenderCommand, ReportCommand, RunCommand, ServeCommand};
use cli::output::*;
use cli::{Cli, Command};
use execution::{CommandRunner, ExecutionEngine, HostRunner, RecordingRunner};
use host::check_host;
use persistence::RunReport;
use status::{LogLevel, StatusBoard};
use std::net::SocketAddr;
use std::sync::atomic::Ordering;
use std::sync::Arc;
use tokio::time::Duration;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::from_args();

    // Initialize logging
    let log_level = if cli.verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("Failed to set logging subscriber")?;

    let settings = Settings::load(cli.settings.as_deref())?;

    // Execute command
    match &cli.command {
        Command::Run(cmd) => run_deployment(cmd, &settings).await?,
        Command::Serve(cmd) => serve_api(cmd, &settings).await?,
        Command::Configure(_) => configure(&settings)?,
        Command::Render(cmd) => render_artifacts(cmd, &settings)?,
        Command::Report(cmd) => show_report(cmd, &settings)?,
    }

    Ok(())
}

async fn run_deployment(cmd: &RunCommand, settings: &Settings) -> Result<()> {
    let config = if cmd.use_stored {
        Configuration::load(&settings.config_path())
            .context("No stored configuration; run `provisor configure` first")?
    } else {
        cli::prompts::collect_configuration(&settings.password_policy)?
    };

    println!(
        "{} Provisioning {} for {}",
        INFO,
        style(&settings.app_name).bold(),
        style(&config.domain).cyan()
    );

    let plan =
        Plan::new(catalog::builtin_steps(settings, &config)).context("Invalid step graph")?;
    let board = Arc::new(StatusBoard::new(settings.log_capacity));

    // The status API reports progress while the run executes
    let api_task = if cmd.no_api {
        None
    } else {
        let server = Arc::new(ApiServer::new(board.clone(), Arc::new(settings.clone())));
        let addr: SocketAddr = ([0, 0, 0, 0], settings.api_port).into();
        Some(tokio::spawn(async move {
            if let Err(err) = server.serve(addr).await {
                error!(error = %err, "Status API stopped");
            }
        }))
    };

    let run = if cmd.dry_run {
        println!(
            "{} Dry run: commands are {}, not executed",
            INFO,
            style("printed").bold()
        );
        execute_plan(RecordingRunner::new(), &plan, settings, &config, board).await
    } else {
        if let Err(err) = check_host(&HostRunner).await {
            println!("{} {}", CROSS, style(err).red());
            std::process::exit(1);
        }
        execute_plan(HostRunner, &plan, settings, &config, board).await
    };

    if let Some(task) = api_task {
        task.abort();
    }

    let report = RunReport::from_run(&run, &config);
    let path = report.save(&settings.state_dir())?;
    println!("\n{}", format_report(&report));
    println!(
        "\n{} Report saved to {}",
        INFO,
        style(path.display()).dim()
    );

    if run.state == RunState::Completed {
        println!(
            "\n{} {} provisioned {}",
            CHECK,
            style(&config.domain).bold(),
            style("successfully").green()
        );
    } else {
        println!(
            "\n{} Provisioning {} {}",
            CROSS,
            style(&config.domain).bold(),
            style("did not complete").red()
        );
        std::process::exit(1);
    }

    Ok(())
}

async fn execute_plan<R>(
    runner: R,
    plan: &Plan,
    settings: &Settings,
    config: &Configuration,
    board: Arc<StatusBoard>,
) -> DeploymentRun
where
    R: CommandRunner + 'static,
{
    let mut engine = ExecutionEngine::new(runner, board);
    if let Some(secs) = settings.step_timeout_secs {
        engine = engine.with_step_timeout(Duration::from_secs(secs));
    }

    // Drive the progress bar off execution events
    let progress = create_progress_bar(plan.len());
    let bar = progress.clone();
    engine.add_event_handler(move |event| {
        match &event {
            ExecutionEvent::StepStarted { step_id, .. } => bar.set_message(step_id.clone()),
            ExecutionEvent::StepSkipped { .. }
            | ExecutionEvent::StepSucceeded { .. }
            | ExecutionEvent::StepFailed { .. } => bar.inc(1),
            _ => {}
        }
        bar.println(format_execution_event(&event));
    });

    // Ctrl-C finishes the step in flight, then stops the run
    let halt = engine.halt_flag();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            halt.store(true, Ordering::SeqCst);
        }
    });

    let run = engine.execute(plan, settings, config).await;
    ctrl_c.abort();
    progress.finish_and_clear();
    run
}

async fn serve_api(cmd: &ServeCommand, settings: &Settings) -> Result<()> {
    let board = Arc::new(StatusBoard::new(settings.log_capacity));
    board
        .append_log(
            LogLevel::Info,
            None,
            "status api serving; no run in progress".to_string(),
        )
        .await;

    let port = cmd.port.unwrap_or(settings.api_port);
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    let server = Arc::new(ApiServer::new(board, Arc::new(settings.clone())));

    println!("{} Status API on port {}", ROCKET, style(port).cyan());

    tokio::select! {
        result = server.serve(addr) => result.map_err(Into::into),
        _ = tokio::signal::ctrl_c() => {
            println!("\n{} Shutting down", INFO);
            Ok(())
        }
    }
}

fn configure(settings: &Settings) -> Result<()> {
    let config = cli::prompts::collect_configuration(&settings.password_policy)?;
    config.save(&settings.config_path())?;
    println!(
        "{} Configuration for {} stored at {}",
        CHECK,
        style(&config.domain).bold(),
        style(settings.config_path().display()).dim()
    );
    Ok(())
}

fn render_artifacts(cmd: &RenderCommand, settings: &Settings) -> Result<()> {
    let config = Configuration::load(&settings.config_path())
        .context("No stored configuration; run `provisor configure` first")?;

    let vhost = if cmd.tls {
        Artifact::ProxyVhostTls
    } else {
        Artifact::ProxyVhost
    };
    let files = [
        ("app.env", Artifact::EnvFile),
        ("vhost.conf", vhost),
        ("ecosystem.config.json", Artifact::SupervisorDescriptor),
    ];

    let out_dir = std::path::Path::new(&cmd.out_dir);
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create {}", out_dir.display()))?;

    for (name, artifact) in files {
        let text = render::render_artifact(artifact, settings, &config)?;
        let dest = out_dir.join(name);
        std::fs::write(&dest, text)?;
        println!("{} Rendered {}", CHECK, style(dest.display()).dim());
    }

    Ok(())
}

fn show_report(cmd: &ReportCommand, settings: &Settings) -> Result<()> {
    let report = RunReport::load_latest(&settings.state_dir())?;

    if cmd.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("{}", format_report(&report));
    }

    Ok(())
}

use execution::ExecutionEvent;

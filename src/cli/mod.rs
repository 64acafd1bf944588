//! Command-line interface

pub mod commands;
pub mod output;
pub mod prompts;

use clap::{Parser, Subcommand};
use commands::{ConfigureCommand, RenderCommand, ReportCommand, RunCommand, ServeCommand};

/// Single-host provisioning tool for the billing application
#[derive(Debug, Parser, Clone)]
#[command(name = "provisor")]
#[command(author = "Provisor Contributors")]
#[command(version = "0.1.0")]
#[command(about = "Provision a host for the billing application", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Path to a settings YAML file
    #[arg(short, long, global = true)]
    pub settings: Option<String>,
}

/// Available commands
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Run the provisioning pipeline
    Run(RunCommand),

    /// Serve the status API without deploying
    Serve(ServeCommand),

    /// Collect and store configuration interactively
    Configure(ConfigureCommand),

    /// Render deployment artifacts locally
    Render(RenderCommand),

    /// Show the latest run report
    Report(ReportCommand),
}

impl Cli {
    /// Parse CLI arguments from environment
    pub fn from_args() -> Self {
        Self::parse()
    }

    /// Parse CLI arguments from a slice
    pub fn try_parse_from<I, T>(itr: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        <Self as Parser>::try_parse_from(itr)
    }
}

use std::ffi::OsString;

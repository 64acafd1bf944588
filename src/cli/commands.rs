//! CLI command definitions

use clap::Args;

/// Run the provisioning pipeline
#[derive(Debug, Args, Clone)]
pub struct RunCommand {
    /// Print the planned commands without touching the host
    #[arg(long)]
    pub dry_run: bool,

    /// Reuse the stored configuration instead of prompting
    #[arg(long)]
    pub use_stored: bool,

    /// Don't start the status API alongside the run
    #[arg(long)]
    pub no_api: bool,
}

/// Serve the status API without running a deployment
#[derive(Debug, Args, Clone)]
pub struct ServeCommand {
    /// Port to listen on (defaults to the configured API port)
    #[arg(short, long)]
    pub port: Option<u16>,
}

/// Collect and store configuration interactively
#[derive(Debug, Args, Clone)]
pub struct ConfigureCommand {}

/// Render deployment artifacts to a local directory
#[derive(Debug, Args, Clone)]
pub struct RenderCommand {
    /// Directory to write rendered files into
    #[arg(short, long, default_value = "rendered")]
    pub out_dir: String,

    /// Render the TLS virtual host instead of the plain one
    #[arg(long)]
    pub tls: bool,
}

/// Show the report from the most recent run
#[derive(Debug, Args, Clone)]
pub struct ReportCommand {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,
}

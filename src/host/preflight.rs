//! Host prerequisite checks
//!
//! Run before any step: a host missing one of these tools cannot be
//! provisioned at all, and failing fast beats failing halfway through.

use crate::error::{ProvisorError, Result};
use crate::execution::runner::CommandRunner;
use tracing::{debug, info};

/// Tools the step inventory assumes are present.
pub const REQUIRED_TOOLS: [&str; 4] = ["apt-get", "systemctl", "git", "curl"];

/// Verify required host tooling, reporting the first missing tool.
pub async fn check_host(runner: &dyn CommandRunner) -> Result<()> {
    for tool in REQUIRED_TOOLS {
        let probe = format!("command -v {}", tool);
        match runner.probe(&probe).await {
            Ok(output) if output.success => {
                debug!(tool = %tool, "Prerequisite present");
            }
            _ => {
                return Err(ProvisorError::PrerequisiteMissing {
                    tool: tool.to_string(),
                });
            }
        }
    }
    info!("Host prerequisites satisfied");
    Ok(())
}

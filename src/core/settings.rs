//! Orchestrator settings
//!
//! Settings describe the target layout of the host (ports, paths, database
//! names) and orchestrator behavior (timeouts, log capacity). They are loaded
//! from a YAML file when one is given and fall back to built-in defaults
//! otherwise. Operator input (domain, credentials) is collected separately.

use crate::validate::PasswordPolicy;
use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Application name, reused for the proxy site and supervisor process
    pub app_name: String,

    /// Git repository the application is fetched from
    pub repo_url: String,

    /// Directory the application is installed into
    pub install_root: String,

    /// Entry script started by the process supervisor
    pub app_script: String,

    /// Port the application listens on behind the proxy
    pub app_port: u16,

    /// Port the status API binds to
    pub api_port: u16,

    /// Database name created for the application
    pub db_name: String,

    /// Database role the application connects as
    pub db_user: String,

    /// Memory ceiling before the supervisor restarts the application
    pub memory_limit: String,

    /// In-memory log buffer size for the status API
    pub log_capacity: usize,

    /// Soft per-step timeout; unset means steps may run indefinitely
    pub step_timeout_secs: Option<u64>,

    /// Where reports and stored configuration live; defaults to the
    /// platform data directory
    pub state_dir: Option<PathBuf>,

    /// Password acceptance rules
    pub password_policy: PasswordPolicy,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app_name: "vpn-billing".to_string(),
            repo_url: "https://github.com/yourusername/vpn-billing.git".to_string(),
            install_root: "/opt/vpn-billing".to_string(),
            app_script: "server.js".to_string(),
            app_port: 3000,
            api_port: 5000,
            db_name: "vpn_billing".to_string(),
            db_user: "vpn_billing".to_string(),
            memory_limit: "300M".to_string(),
            log_capacity: 1000,
            step_timeout_secs: None,
            state_dir: None,
            password_policy: PasswordPolicy::default(),
        }
    }
}

impl Settings {
    /// Load settings from a YAML file, or defaults when no path is given.
    pub fn load(path: Option<&str>) -> Result<Self> {
        match path {
            Some(p) => Self::from_file(p),
            None => {
                let settings = Self::default();
                settings.validate()?;
                Ok(settings)
            }
        }
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).with_context(|| {
            format!("Failed to read settings file: {}", path.as_ref().display())
        })?;
        Self::from_yaml(&content)
    }

    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let settings: Settings = serde_yaml::from_str(yaml).context("Failed to parse settings")?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.app_name.is_empty() {
            bail!("app_name must not be empty");
        }
        if self.repo_url.is_empty() {
            bail!("repo_url must not be empty");
        }
        if self.install_root.is_empty() {
            bail!("install_root must not be empty");
        }
        if self.app_port == 0 || self.api_port == 0 {
            bail!("ports must be non-zero");
        }
        if self.app_port == self.api_port {
            bail!("app_port and api_port must differ");
        }
        if self.db_name.is_empty() || self.db_user.is_empty() {
            bail!("database name and user must not be empty");
        }
        if self.log_capacity == 0 {
            bail!("log_capacity must be at least 1");
        }
        Ok(())
    }

    /// Directory for run reports and stored configuration.
    pub fn state_dir(&self) -> PathBuf {
        match &self.state_dir {
            Some(dir) => dir.clone(),
            None => dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("/var/lib"))
                .join("provisor"),
        }
    }

    /// Location of the stored configuration accepted via CLI or API.
    pub fn config_path(&self) -> PathBuf {
        self.state_dir().join("config.json")
    }
}

//! Step domain model

/// Failure handling for a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classification {
    /// Failure aborts the run; steps depending on this one never start
    Fatal,

    /// Failure is recorded and the run continues
    WarnOnly,
}

/// Side-effect-free inspection deciding whether a step already ran.
#[derive(Debug, Clone)]
pub enum Probe {
    /// Probe command exits zero
    CommandOk { command: String },

    /// Probe command exits zero and its stdout contains `needle`
    CommandOutputContains { command: String, needle: String },

    /// File or directory is present
    PathExists { path: String },

    /// File is present and contains `needle`
    FileContains { path: String, needle: String },
}

/// Configuration artifact rendered from validated input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Artifact {
    /// Application environment file
    EnvFile,

    /// Reverse proxy virtual host (plain HTTP)
    ProxyVhost,

    /// Reverse proxy virtual host with TLS termination and HTTP redirect
    ProxyVhostTls,

    /// Process supervisor descriptor
    SupervisorDescriptor,
}

/// One element of a step's action, executed in order.
#[derive(Debug, Clone)]
pub enum Directive {
    /// Run a shell command on the host
    Run { command: String },

    /// Render an artifact and write it to `dest`
    Render { artifact: Artifact, dest: String },
}

/// A single provisioning step.
#[derive(Debug, Clone)]
pub struct Step {
    /// Unique step identifier
    pub id: String,

    /// Human-readable summary shown in progress output
    pub summary: String,

    /// Step IDs that must be reached before this one runs
    pub depends_on: Vec<String>,

    /// Failure handling
    pub classification: Classification,

    /// Precondition making re-runs safe
    pub probe: Probe,

    /// Side-effecting work, in order
    pub action: Vec<Directive>,
}

impl Step {
    pub fn is_fatal(&self) -> bool {
        self.classification == Classification::Fatal
    }
}

//! Error taxonomy for the orchestrator
//!
//! Library code returns `ProvisorError` so callers can react per kind; the
//! binary wraps these in `anyhow` at the edges for context chains.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ProvisorError>;

/// A rejected input field and the reason it was rejected.
///
/// Serialized as-is into API error responses, so the field names are part of
/// the wire shape.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[error("{field}: {reason}")]
pub struct ValidationError {
    /// Logical field name ("domain", "username", "password", "confirm")
    pub field: String,

    /// Human-readable rejection reason
    pub reason: String,
}

impl ValidationError {
    pub fn new(field: &str, reason: &str) -> Self {
        Self {
            field: field.to_string(),
            reason: reason.to_string(),
        }
    }
}

/// Everything that can go wrong while provisioning a host.
#[derive(Debug, Error)]
pub enum ProvisorError {
    #[error("invalid input: {0}")]
    Validation(#[from] ValidationError),

    #[error("required host tool missing: {tool}")]
    PrerequisiteMissing { tool: String },

    #[error("step '{step_id}' failed: {cause}")]
    StepExecution { step_id: String, cause: String },

    #[error("unknown template placeholder '{placeholder}'")]
    Template { placeholder: String },

    #[error("connection check failed: {message}")]
    Network { message: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

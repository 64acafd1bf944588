//! Validated operator input plus generated secrets
//!
//! A `Configuration` is immutable once a run starts: the engine and renderer
//! only ever read it. It is persisted as JSON so the API-driven flow and the
//! CLI flow can hand off to each other. The stored file contains secrets and
//! must stay inside the state directory; run reports never include it.

use crate::error::Result;
use crate::secret;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::io;
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Configuration {
    /// Public domain the application is served under
    pub domain: String,

    /// Administrator login name
    pub admin_username: String,

    /// Administrator contact email, also used for certificate registration
    pub admin_email: String,

    /// Administrator password, stored as supplied
    pub admin_password: String,

    /// Machine-generated secrets keyed by name
    pub generated_secrets: BTreeMap<String, String>,
}

impl Configuration {
    /// Build a configuration from already-validated input, generating the
    /// session signing secret and database password.
    pub fn assemble(
        domain: String,
        admin_username: String,
        admin_email: String,
        admin_password: String,
    ) -> Self {
        let mut generated_secrets = BTreeMap::new();
        generated_secrets.insert(
            secret::SESSION_SECRET.to_string(),
            secret::generate(secret::SESSION_SECRET_BYTES),
        );
        generated_secrets.insert(
            secret::DB_PASSWORD.to_string(),
            secret::generate(secret::DB_PASSWORD_BYTES),
        );
        Self {
            domain,
            admin_username,
            admin_email,
            admin_password,
            generated_secrets,
        }
    }

    pub fn secret(&self, name: &str) -> Option<&str> {
        self.generated_secrets.get(name).map(String::as_str)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load a previously stored configuration. Rejects files missing the
    /// generated secrets, since every consumer relies on them being present.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let config: Configuration = serde_json::from_str(&text)?;
        for key in [secret::SESSION_SECRET, secret::DB_PASSWORD] {
            if config.secret(key).map_or(true, str::is_empty) {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    format!("stored configuration is missing secret '{}'", key),
                )
                .into());
            }
        }
        Ok(config)
    }
}

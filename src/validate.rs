//! Pure input format checks
//!
//! Each function returns the accepted value or a field-tagged rejection
//! reason. No I/O happens here; prompting and re-asking live with the
//! callers, so the same checks back both the CLI prompts and the HTTP API.

use crate::error::ValidationError;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

static DOMAIN_RE: OnceLock<Regex> = OnceLock::new();
static USERNAME_RE: OnceLock<Regex> = OnceLock::new();
static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn domain_re() -> &'static Regex {
    DOMAIN_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9][A-Za-z0-9.-]{1,61}[A-Za-z0-9]\.[A-Za-z]{2,}$").unwrap()
    })
}

fn username_re() -> &'static Regex {
    USERNAME_RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9_]{3,20}$").unwrap())
}

fn email_re() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        Regex::new(r"^[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}$").unwrap()
    })
}

/// Password acceptance rules, configurable through the settings file.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordPolicy {
    /// Minimum accepted length
    pub min_length: usize,

    /// Require at least one uppercase letter, one lowercase letter and one digit
    pub require_classes: bool,
}

impl Default for PasswordPolicy {
    fn default() -> Self {
        Self {
            min_length: 8,
            require_classes: true,
        }
    }
}

/// Check a public domain name. Returns the trimmed value on success.
pub fn domain(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if domain_re().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::new(
            "domain",
            "must be a fully qualified domain name like vpn.example.com",
        ))
    }
}

/// Check an administrator username.
pub fn username(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if username_re().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::new(
            "username",
            "must be 3-20 characters using letters, digits or underscores",
        ))
    }
}

/// Check a contact email address. This is a shape check, not a deliverability
/// check.
pub fn email(input: &str) -> Result<String, ValidationError> {
    let trimmed = input.trim();
    if email_re().is_match(trimmed) {
        Ok(trimmed.to_string())
    } else {
        Err(ValidationError::new(
            "email",
            "must look like name@example.com",
        ))
    }
}

/// Check a password against the policy. Whitespace is significant, so the
/// input is not trimmed.
pub fn password(input: &str, policy: &PasswordPolicy) -> Result<String, ValidationError> {
    if input.chars().count() < policy.min_length {
        return Err(ValidationError::new(
            "password",
            &format!("length must be at least {} characters", policy.min_length),
        ));
    }

    if policy.require_classes {
        let has_upper = input.chars().any(|c| c.is_ascii_uppercase());
        let has_lower = input.chars().any(|c| c.is_ascii_lowercase());
        let has_digit = input.chars().any(|c| c.is_ascii_digit());
        if !(has_upper && has_lower && has_digit) {
            return Err(ValidationError::new(
                "password",
                "must mix uppercase and lowercase letters with at least one digit",
            ));
        }
    }

    Ok(input.to_string())
}

/// Check that a password confirmation matches the first entry.
pub fn confirm_match(password: &str, confirmation: &str) -> Result<String, ValidationError> {
    if password == confirmation {
        Ok(password.to_string())
    } else {
        Err(ValidationError::new("confirm", "entries do not match"))
    }
}

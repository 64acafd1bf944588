//! Interactive prompts for collecting deployment configuration
//!
//! Each prompt re-asks until the entry passes the matching check from
//! `crate::validate`, so a typo never aborts the session. Passwords are read
//! without echo and confirmed with a second entry.

use crate::cli::output::{style, CROSS};
use crate::core::config::Configuration;
use crate::error::ValidationError;
use crate::validate::{self, PasswordPolicy};
use anyhow::Result;
use console::Term;

/// Walk the operator through all required fields and assemble a
/// ready-to-store configuration.
pub fn collect_configuration(policy: &PasswordPolicy) -> Result<Configuration> {
    let term = Term::stdout();
    term.write_line("Enter the deployment details. Entries are checked as you go.")?;

    let domain = prompt_until_valid(&term, "Domain (e.g. vpn.example.com)", validate::domain)?;
    let username = prompt_until_valid(&term, "Admin username", validate::username)?;
    let email = prompt_until_valid(&term, "Admin email", validate::email)?;
    let password = prompt_password(&term, policy)?;

    Ok(Configuration::assemble(domain, username, email, password))
}

fn prompt_until_valid<F>(term: &Term, label: &str, check: F) -> Result<String>
where
    F: Fn(&str) -> std::result::Result<String, ValidationError>,
{
    loop {
        term.write_str(&format!("{}: ", label))?;
        let entry = term.read_line()?;
        match check(&entry) {
            Ok(value) => return Ok(value),
            Err(err) => {
                term.write_line(&format!("{}{}", CROSS, style(err).red()))?;
            }
        }
    }
}

fn prompt_password(term: &Term, policy: &PasswordPolicy) -> Result<String> {
    loop {
        term.write_str("Admin password: ")?;
        let entry = term.read_secure_line()?;
        let password = match validate::password(&entry, policy) {
            Ok(password) => password,
            Err(err) => {
                term.write_line(&format!("{}{}", CROSS, style(err).red()))?;
                continue;
            }
        };

        term.write_str("Confirm password: ")?;
        let confirmation = term.read_secure_line()?;
        match validate::confirm_match(&password, &confirmation) {
            Ok(password) => return Ok(password),
            Err(err) => {
                term.write_line(&format!("{}{}", CROSS, style(err).red()))?;
            }
        }
    }
}

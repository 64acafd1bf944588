//! Artifact rendering
//!
//! A deliberately small template language: `{{ name }}` placeholders replaced
//! from an allow-list of values. Substitution is literal, with no expressions
//! and no recursive expansion, so rendered artifacts cannot smuggle in
//! anything the value map does not contain. Referencing a name outside the
//! map is an error, not an empty string.

pub mod artifacts;

pub use artifacts::{render_artifact, values};

use crate::error::{ProvisorError, Result};
use regex::Regex;
use std::collections::HashMap;
use std::sync::OnceLock;

static PLACEHOLDER_RE: OnceLock<Regex> = OnceLock::new();

fn placeholder_re() -> &'static Regex {
    PLACEHOLDER_RE.get_or_init(|| Regex::new(r"\{\{\s*([A-Za-z0-9_]+)\s*\}\}").unwrap())
}

/// Substitute every `{{ name }}` in `template` from `values`.
pub fn render(template: &str, values: &HashMap<String, String>) -> Result<String> {
    let re = placeholder_re();
    let mut out = String::with_capacity(template.len());
    let mut last = 0;

    for m in re.find_iter(template) {
        let name = m
            .as_str()
            .trim_start_matches("{{")
            .trim_end_matches("}}")
            .trim();
        out.push_str(&template[last..m.start()]);
        match values.get(name) {
            Some(value) => out.push_str(value),
            None => {
                return Err(ProvisorError::Template {
                    placeholder: name.to_string(),
                })
            }
        }
        last = m.end();
    }

    out.push_str(&template[last..]);
    Ok(out)
}

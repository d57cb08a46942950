//! API key resolution for the text model
//!
//! The key is looked up in a list of environment variables, first hit wins.
//! The default list is `GEMINI_API_KEY`, `GOOGLE_AI_API_KEY`,
//! `GENERATIVE_AI_KEY`.

use autoblog_core::{AutoblogError, Result};
use regex::Regex;
use std::env;
use std::sync::OnceLock;

/// Return the first non-blank value among `env_names`
pub fn resolve_api_key(env_names: &[String]) -> Result<String> {
    for name in env_names {
        if let Ok(value) = env::var(name) {
            let value = value.trim();
            if !value.is_empty() {
                tracing::info!("Using API key from {}", name);
                return Ok(value.to_string());
            }
        }
    }

    Err(AutoblogError::Auth(format!(
        "Gemini API key not found in environment variables. Set one of: {}",
        env_names.join(", ")
    )))
}

/// Shape check for Google API keys. Diagnostics only, never a gate.
pub fn looks_like_api_key(key: &str) -> bool {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN
        .get_or_init(|| Regex::new(r"^AIza[0-9A-Za-z_-]{35}$").expect("static regex"))
        .is_match(key)
}

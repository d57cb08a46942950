//! Unified error types for autoblog

use thiserror::Error;

/// Unified error type for all autoblog operations
#[derive(Error, Debug)]
pub enum AutoblogError {
    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    // Content generation errors
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Quota exceeded: {0}")]
    QuotaExceeded(String),

    #[error("Generation failed: {0}")]
    Generation(String),

    // Browser errors
    #[error("Browser error: {0}")]
    Browser(String),

    #[error("Browser launch failed: {0}")]
    BrowserLaunch(String),

    #[error("{target} not found")]
    LocatorNotFound { target: String },

    #[error("Timed out: {0}")]
    Timeout(String),

    // Storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Blog not found: {0}")]
    BlogNotFound(u64),

    // Request errors
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

impl AutoblogError {
    /// Shorthand for a locator that never resolved
    pub fn not_found(target: impl Into<String>) -> Self {
        Self::LocatorNotFound {
            target: target.into(),
        }
    }

    /// Stable machine-readable code, surfaced by the HTTP layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::Config(_) => "CONFIG_ERROR",
            Self::Auth(_) => "INVALID_API_KEY",
            Self::QuotaExceeded(_) => "QUOTA_EXCEEDED",
            Self::Generation(_) => "GENERATION_FAILED",
            Self::Browser(_) => "BROWSER_ERROR",
            Self::BrowserLaunch(_) => "LAUNCH_FAILED",
            Self::LocatorNotFound { .. } => "LOCATOR_NOT_FOUND",
            Self::Timeout(_) => "TIMEOUT",
            Self::Storage(_) => "STORAGE_ERROR",
            Self::BlogNotFound(_) => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_FAILED",
            Self::RateLimited(_) => "RATE_LIMITED",
            Self::Io(_) => "IO_ERROR",
            Self::Serialization(_) => "SERIALIZATION_ERROR",
            Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error must escape an automation run instead of being
    /// folded into a failed outcome
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::BrowserLaunch(_))
    }
}

/// Result type alias using AutoblogError
pub type Result<T> = std::result::Result<T, AutoblogError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_locator_message_names_target() {
        let err = AutoblogError::not_found("password field");
        assert_eq!(err.to_string(), "password field not found");
        assert_eq!(err.code(), "LOCATOR_NOT_FOUND");
    }

    #[test]
    fn test_only_launch_is_fatal() {
        assert!(AutoblogError::BrowserLaunch("no chrome".into()).is_fatal());
        assert!(!AutoblogError::Browser("detached".into()).is_fatal());
        assert!(!AutoblogError::not_found("post button").is_fatal());
    }
}

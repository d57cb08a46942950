//! Ordered fallback search for one logical UI target

use crate::driver::PageDriver;
use crate::wait::wait_for;
use autoblog_core::{AutoblogError, Result};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// One strategy for finding an element
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// CSS selector
    Css(String),
    /// Element under `scope` whose trimmed text equals one of `labels`,
    /// case-insensitively
    Label { scope: String, labels: Vec<String> },
}

impl Candidate {
    pub fn css(selector: impl Into<String>) -> Self {
        Self::Css(selector.into())
    }

    pub fn label(scope: impl Into<String>, labels: &[&str]) -> Self {
        Self::Label {
            scope: scope.into(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// Selector usable for follow-up interaction, if this is a CSS candidate
    pub fn selector(&self) -> Option<&str> {
        match self {
            Self::Css(sel) => Some(sel),
            Self::Label { .. } => None,
        }
    }

    async fn probe(&self, page: &dyn PageDriver) -> Result<bool> {
        match self {
            Self::Css(sel) => page.exists(sel).await,
            Self::Label { scope, labels } => page.label_exists(scope, labels, None).await,
        }
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Css(sel) => write!(f, "{}", sel),
            Self::Label { scope, labels } => write!(f, "{}:text({})", scope, labels.join("|")),
        }
    }
}

/// Prioritised candidates for a named target; first match wins
#[derive(Debug, Clone)]
pub struct FieldLocator {
    target: String,
    candidates: Vec<Candidate>,
}

impl FieldLocator {
    pub fn new(target: impl Into<String>, candidates: Vec<Candidate>) -> Self {
        Self {
            target: target.into(),
            candidates,
        }
    }

    /// Shorthand for a locator made only of CSS selectors
    pub fn css(target: impl Into<String>, selectors: &[&str]) -> Self {
        Self::new(target, selectors.iter().map(|s| Candidate::css(*s)).collect())
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Try each candidate in order, giving each up to `per_candidate` to
    /// appear. Returns the first that matched, or `LocatorNotFound`.
    pub async fn resolve(
        &self,
        page: &dyn PageDriver,
        per_candidate: Duration,
        poll: Duration,
    ) -> Result<&Candidate> {
        for candidate in &self.candidates {
            debug!("Looking for {} via {}", self.target, candidate);
            if wait_for(poll, per_candidate, move || candidate.probe(page)).await {
                debug!("Found {} via {}", self.target, candidate);
                return Ok(candidate);
            }
        }
        Err(AutoblogError::not_found(self.target.clone()))
    }

    /// Single pass over the candidates with no waiting
    pub async fn find_now(&self, page: &dyn PageDriver) -> Option<&Candidate> {
        for candidate in &self.candidates {
            if candidate.probe(page).await.unwrap_or(false) {
                return Some(candidate);
            }
        }
        None
    }
}

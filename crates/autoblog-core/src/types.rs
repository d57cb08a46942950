//! Core type definitions for autoblog

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AutoblogError;
use crate::payload;

/// Requested article length
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Length {
    Short,
    #[default]
    Medium,
    Long,
}

impl Length {
    /// Target word range handed to the model
    pub fn word_range(&self) -> &'static str {
        match self {
            Self::Short => "300-500",
            Self::Medium => "800-1200",
            Self::Long => "1500-2500",
        }
    }

    /// Parse, falling back to the default on unknown input
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for Length {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Short => write!(f, "short"),
            Self::Medium => write!(f, "medium"),
            Self::Long => write!(f, "long"),
        }
    }
}

impl std::str::FromStr for Length {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "short" => Ok(Self::Short),
            "medium" => Ok(Self::Medium),
            "long" => Ok(Self::Long),
            _ => Err(format!("Invalid length: {}. Use short, medium, or long.", s)),
        }
    }
}

/// Writing style
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Style {
    #[default]
    Casual,
    Professional,
    Friendly,
}

impl Style {
    /// Tone instruction handed to the model
    pub fn tone(&self) -> &'static str {
        match self {
            Self::Casual => "casual and engaging",
            Self::Professional => "professional and authoritative",
            Self::Friendly => "friendly and conversational",
        }
    }

    /// Parse, falling back to the default on unknown input
    pub fn parse_or_default(s: Option<&str>) -> Self {
        s.and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

impl std::fmt::Display for Style {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Casual => write!(f, "casual"),
            Self::Professional => write!(f, "professional"),
            Self::Friendly => write!(f, "friendly"),
        }
    }
}

impl std::str::FromStr for Style {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "casual" => Ok(Self::Casual),
            "professional" => Ok(Self::Professional),
            "friendly" => Ok(Self::Friendly),
            _ => Err(format!(
                "Invalid style: {}. Use casual, professional, or friendly.",
                s
            )),
        }
    }
}

/// Login credentials for the social site
///
/// `Debug` redacts the secret. There is deliberately no `Serialize` impl.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Credentials {
    pub identifier: String,
    pub secret: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            secret: secret.into(),
        }
    }

    /// Both halves present and non-blank
    pub fn is_complete(&self) -> bool {
        !self.identifier.trim().is_empty() && !self.secret.is_empty()
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// One publish attempt against the social site
#[derive(Debug, Clone)]
pub struct PublishRequest {
    pub payload_text: String,
    pub link_placeholder_token: String,
    pub resolved_link: Option<String>,
    pub credentials: Credentials,
}

impl PublishRequest {
    pub fn new(payload_text: impl Into<String>, credentials: Credentials) -> Self {
        Self {
            payload_text: payload_text.into(),
            link_placeholder_token: payload::DEFAULT_LINK_PLACEHOLDER.to_string(),
            resolved_link: None,
            credentials,
        }
    }

    pub fn with_placeholder(mut self, token: impl Into<String>) -> Self {
        self.link_placeholder_token = token.into();
        self
    }

    pub fn with_link(mut self, link: Option<String>) -> Self {
        self.resolved_link = link.filter(|l| !l.trim().is_empty());
        self
    }

    /// Text that will actually be typed into the composer
    pub fn final_text(&self) -> String {
        payload::substitute_link(
            &self.payload_text,
            &self.link_placeholder_token,
            self.resolved_link.as_deref(),
        )
    }

    /// Reject text the site would refuse, before any browser is started
    pub fn validate(&self) -> crate::Result<()> {
        let text = self.final_text();
        if text.trim().is_empty() {
            return Err(AutoblogError::Validation("Post text is empty".to_string()));
        }
        let len = text.chars().count();
        if len > payload::MAX_POST_CHARS {
            return Err(AutoblogError::Validation(format!(
                "Post is {} characters; the limit is {}",
                len,
                payload::MAX_POST_CHARS
            )));
        }
        Ok(())
    }
}

/// Which signal confirmed that the post went through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConfirmationSignal {
    /// The site showed its transient "post sent" notification
    Toast,
    /// The composer emptied or disappeared
    ComposerCleared,
}

/// Result of one automation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishOutcome {
    pub succeeded: bool,
    pub final_text: String,
    pub timestamp: DateTime<Utc>,
    pub diagnostic: Option<String>,
    /// `None` on a successful run means best-effort success
    pub confirmation: Option<ConfirmationSignal>,
    /// States visited, in order
    #[serde(default)]
    pub trace: Vec<String>,
}

impl PublishOutcome {
    pub fn success(final_text: impl Into<String>) -> Self {
        Self {
            succeeded: true,
            final_text: final_text.into(),
            timestamp: Utc::now(),
            diagnostic: None,
            confirmation: None,
            trace: Vec::new(),
        }
    }

    pub fn failure(final_text: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self {
            succeeded: false,
            final_text: final_text.into(),
            timestamp: Utc::now(),
            diagnostic: Some(diagnostic.into()),
            confirmation: None,
            trace: Vec::new(),
        }
    }

    pub fn with_confirmation(mut self, signal: Option<ConfirmationSignal>) -> Self {
        self.confirmation = signal;
        self
    }

    pub fn with_diagnostic(mut self, diagnostic: impl Into<String>) -> Self {
        self.diagnostic = Some(diagnostic.into());
        self
    }

    pub fn with_trace(mut self, trace: Vec<String>) -> Self {
        self.trace = trace;
        self
    }

    /// Succeeded without positive confirmation from the site
    pub fn is_best_effort(&self) -> bool {
        self.succeeded && self.confirmation.is_none()
    }
}

/// An article as kept by the blog store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogRecord {
    pub id: u64,
    pub title: String,
    pub content: String,
    pub tweet: Option<String>,
    pub views: u64,
    pub likes: u64,
    pub published: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields supplied when creating or replacing a blog record
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogDraft {
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub tweet: Option<String>,
    #[serde(default = "default_published")]
    pub published: bool,
}

fn default_published() -> bool {
    true
}

impl BlogDraft {
    pub fn new(title: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            content: content.into(),
            tweet: None,
            published: true,
        }
    }

    pub fn with_tweet(mut self, tweet: impl Into<String>) -> Self {
        self.tweet = Some(tweet.into());
        self
    }
}

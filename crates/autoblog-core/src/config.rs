//! Configuration management for autoblog
//!
//! Settings live in `autoblog.toml`. Every section is optional and missing
//! fields fall back to the defaults below, so an absent file is a valid
//! configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::payload::DEFAULT_LINK_PLACEHOLDER;
use crate::{AutoblogError, Result};

/// Default config file name, looked up in the working directory
pub const CONFIG_FILE: &str = "autoblog.toml";

/// Service-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AutoblogConfig {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Content generator settings
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Browser automation settings
    #[serde(default)]
    pub browser: BrowserConfig,

    /// Publishing settings
    #[serde(default)]
    pub publish: PublishConfig,
}

/// HTTP server settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Requests allowed per client inside one window
    #[serde(default = "default_rate_limit_max")]
    pub rate_limit_max: usize,

    #[serde(default = "default_rate_limit_window_secs")]
    pub rate_limit_window_secs: u64,

    /// User-agent fragments that are refused outright
    #[serde(default = "default_blocked_agents")]
    pub blocked_agents: Vec<String>,
}

/// Content generator settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_base")]
    pub api_base: String,

    /// Environment variables checked for the API key, in priority order
    #[serde(default = "default_api_key_envs")]
    pub api_key_envs: Vec<String>,

    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Retries on server errors (not on quota or auth errors)
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// Link length the blurb leaves room for
    #[serde(default = "default_link_reserve")]
    pub link_reserve: usize,
}

/// Browser automation settings. Durations are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserConfig {
    #[serde(default = "default_true")]
    pub headless: bool,

    #[serde(default = "default_window_width")]
    pub window_width: u32,

    #[serde(default = "default_window_height")]
    pub window_height: u32,

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    #[serde(default = "default_login_url")]
    pub login_url: String,

    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Pause after the login page loads
    #[serde(default = "default_page_settle_ms")]
    pub page_settle_ms: u64,

    /// Budget per identifier candidate and for the password field
    #[serde(default = "default_field_wait_ms")]
    pub field_wait_ms: u64,

    /// Budget per candidate of the identifier-confirmation step
    #[serde(default = "default_confirm_field_wait_ms")]
    pub confirm_field_wait_ms: u64,

    /// Budget per composer candidate while waiting for the home page
    #[serde(default = "default_home_wait_ms")]
    pub home_wait_ms: u64,

    /// Budget per composer candidate once home has loaded
    #[serde(default = "default_composer_wait_ms")]
    pub composer_wait_ms: u64,

    /// Budget per submit-control candidate
    #[serde(default = "default_submit_wait_ms")]
    pub submit_wait_ms: u64,

    /// Pause after each login step submits
    #[serde(default = "default_step_delay_ms")]
    pub step_delay_ms: u64,

    /// Short pause between composer interactions
    #[serde(default = "default_interaction_delay_ms")]
    pub interaction_delay_ms: u64,

    /// Upper bound for the submit control to become enabled
    #[serde(default = "default_settle_ms")]
    pub submit_settle_ms: u64,

    #[serde(default = "default_confirmation_wait_ms")]
    pub confirmation_wait_ms: u64,

    #[serde(default = "default_credential_type_delay_ms")]
    pub credential_type_delay_ms: u64,

    #[serde(default = "default_compose_type_delay_ms")]
    pub compose_type_delay_ms: u64,

    /// Dispatch input/change events after this many typed characters
    #[serde(default = "default_notify_every")]
    pub notify_every_chars: usize,

    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

/// Publishing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishConfig {
    /// Public base URL of the blog, used to build article links
    #[serde(default = "default_public_url")]
    pub public_url: String,

    #[serde(default = "default_placeholder")]
    pub link_placeholder: String,

    /// Browser runs allowed at the same time
    #[serde(default = "default_max_concurrent_runs")]
    pub max_concurrent_runs: usize,

    /// How long a publish call waits for a free browser slot
    #[serde(default = "default_admission_wait_secs")]
    pub admission_wait_secs: u64,
}

// Default value providers
fn default_true() -> bool {
    true
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_rate_limit_max() -> usize {
    5
}

fn default_rate_limit_window_secs() -> u64 {
    60
}

fn default_blocked_agents() -> Vec<String> {
    vec!["bot".to_string(), "crawler".to_string()]
}

fn default_model() -> String {
    "gemini-2.0-flash".to_string()
}

fn default_api_base() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_api_key_envs() -> Vec<String> {
    vec![
        "GEMINI_API_KEY".to_string(),
        "GOOGLE_AI_API_KEY".to_string(),
        "GENERATIVE_AI_KEY".to_string(),
    ]
}

fn default_request_timeout_secs() -> u64 {
    60
}

fn default_max_retries() -> u32 {
    2
}

fn default_link_reserve() -> usize {
    48
}

fn default_window_width() -> u32 {
    1920
}

fn default_window_height() -> u32 {
    1080
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_login_url() -> String {
    "https://x.com/i/flow/login".to_string()
}

fn default_navigation_timeout_ms() -> u64 {
    30_000
}

fn default_page_settle_ms() -> u64 {
    3_000
}

fn default_field_wait_ms() -> u64 {
    10_000
}

fn default_confirm_field_wait_ms() -> u64 {
    5_000
}

fn default_home_wait_ms() -> u64 {
    20_000
}

fn default_composer_wait_ms() -> u64 {
    5_000
}

fn default_submit_wait_ms() -> u64 {
    5_000
}

fn default_step_delay_ms() -> u64 {
    2_000
}

fn default_interaction_delay_ms() -> u64 {
    500
}

fn default_settle_ms() -> u64 {
    3_000
}

fn default_confirmation_wait_ms() -> u64 {
    15_000
}

fn default_credential_type_delay_ms() -> u64 {
    100
}

fn default_compose_type_delay_ms() -> u64 {
    50
}

fn default_notify_every() -> usize {
    10
}

fn default_poll_interval_ms() -> u64 {
    250
}

fn default_public_url() -> String {
    "https://yourblog.com".to_string()
}

fn default_placeholder() -> String {
    DEFAULT_LINK_PLACEHOLDER.to_string()
}

fn default_max_concurrent_runs() -> usize {
    2
}

fn default_admission_wait_secs() -> u64 {
    30
}

impl AutoblogConfig {
    /// Load configuration from `path`, or use defaults when it does not exist
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            toml::from_str(&content).map_err(|e| {
                AutoblogError::Config(format!("Failed to parse {}: {}", path.display(), e))
            })
        } else {
            tracing::debug!("No config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Write the default configuration to `path`
    pub fn write_default(path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let content = toml::to_string_pretty(&Self::default())
            .map_err(|e| AutoblogError::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn rate_limit_window(&self) -> Duration {
        Duration::from_secs(self.rate_limit_window_secs)
    }
}

impl GeneratorConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl PublishConfig {
    /// Public link of one stored article
    pub fn blog_link(&self, id: u64) -> String {
        format!("{}/blogs/{}", self.public_url.trim_end_matches('/'), id)
    }

    pub fn admission_wait(&self) -> Duration {
        Duration::from_secs(self.admission_wait_secs)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            rate_limit_max: default_rate_limit_max(),
            rate_limit_window_secs: default_rate_limit_window_secs(),
            blocked_agents: default_blocked_agents(),
        }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            api_base: default_api_base(),
            api_key_envs: default_api_key_envs(),
            request_timeout_secs: default_request_timeout_secs(),
            max_retries: default_max_retries(),
            link_reserve: default_link_reserve(),
        }
    }
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            headless: true,
            window_width: default_window_width(),
            window_height: default_window_height(),
            user_agent: default_user_agent(),
            login_url: default_login_url(),
            navigation_timeout_ms: default_navigation_timeout_ms(),
            page_settle_ms: default_page_settle_ms(),
            field_wait_ms: default_field_wait_ms(),
            confirm_field_wait_ms: default_confirm_field_wait_ms(),
            home_wait_ms: default_home_wait_ms(),
            composer_wait_ms: default_composer_wait_ms(),
            submit_wait_ms: default_submit_wait_ms(),
            step_delay_ms: default_step_delay_ms(),
            interaction_delay_ms: default_interaction_delay_ms(),
            submit_settle_ms: default_settle_ms(),
            confirmation_wait_ms: default_confirmation_wait_ms(),
            credential_type_delay_ms: default_credential_type_delay_ms(),
            compose_type_delay_ms: default_compose_type_delay_ms(),
            notify_every_chars: default_notify_every(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Default for PublishConfig {
    fn default() -> Self {
        Self {
            public_url: default_public_url(),
            link_placeholder: default_placeholder(),
            max_concurrent_runs: default_max_concurrent_runs(),
            admission_wait_secs: default_admission_wait_secs(),
        }
    }
}

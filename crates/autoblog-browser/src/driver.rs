//! The page-control surface the automaton is written against
//!
//! [`PageDriver`] is deliberately small: probes, clicks, keyboard input and
//! event dispatch. Everything site-specific (which selectors, which labels,
//! in which order) lives in the automaton and its [`SiteProfile`].
//!
//! [`SiteProfile`]: crate::site::SiteProfile

use async_trait::async_trait;
use autoblog_core::config::BrowserConfig;
use autoblog_core::Result;
use std::time::Duration;

/// Control surface of one live page
#[async_trait]
pub trait PageDriver: Send + Sync {
    /// Load `url`, failing after `timeout`
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()>;

    /// Whether `selector` currently matches an element
    async fn exists(&self, selector: &str) -> Result<bool>;

    /// Whether an element under `scope` has one of `labels` as its whole
    /// visible text, compared case-insensitively. With `enabled_colours`,
    /// the element must also pass the enabled check of [`is_enabled`].
    ///
    /// [`is_enabled`]: PageDriver::is_enabled
    async fn label_exists(
        &self,
        scope: &str,
        labels: &[String],
        enabled_colours: Option<&[String]>,
    ) -> Result<bool>;

    /// Same match as [`label_exists`], then a synthetic click on the first
    /// hit. Returns whether anything was clicked.
    ///
    /// [`label_exists`]: PageDriver::label_exists
    async fn click_label(
        &self,
        scope: &str,
        labels: &[String],
        enabled_colours: Option<&[String]>,
    ) -> Result<bool>;

    /// Pointer click at the centre of the element
    async fn click(&self, selector: &str) -> Result<()>;

    /// `element.click()` from script. Returns false when nothing matched.
    async fn synthetic_click(&self, selector: &str) -> Result<bool>;

    async fn focus(&self, selector: &str) -> Result<()>;

    /// Empty the field and focus it
    async fn clear(&self, selector: &str) -> Result<()>;

    /// Type into the focused element one character at a time
    async fn type_text(&self, text: &str, per_char_delay: Duration) -> Result<()>;

    /// Press a named key ("Enter", "End", "ArrowLeft", ...)
    async fn press_key(&self, key: &str) -> Result<()>;

    /// Dispatch bubbling DOM events of the given types on the element
    async fn dispatch_events(&self, selector: &str, events: &[&str]) -> Result<()>;

    /// Not disabled, not `aria-disabled`, and (when `enabled_colours` is
    /// non-empty) painted in one of the given background colours
    async fn is_enabled(&self, selector: &str, enabled_colours: &[String]) -> Result<bool>;

    /// Text content, `None` when the element is absent
    async fn text_content(&self, selector: &str) -> Result<Option<String>>;

    /// Tear down the page and its browser. Consumes the driver, so it can
    /// only happen once.
    async fn close(self: Box<Self>) -> Result<()>;
}

/// Starts one isolated browser and hands back its page
#[async_trait]
pub trait BrowserLauncher: Send + Sync {
    /// Any error here is a fatal launch error. A launcher that fails part
    /// way must release whatever it already started.
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn PageDriver>>;
}

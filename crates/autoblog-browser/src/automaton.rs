//! The sequential login-and-post flow
//!
//! One run walks a fixed sequence of states. Every wait has a budget from
//! [`BrowserConfig`]; only the identifier confirmation step is retried, and
//! only once. Failures after launch are folded into a failed
//! [`PublishOutcome`]; a launch failure is the only error returned.

use crate::browser::ChromeLauncher;
use crate::driver::{BrowserLauncher, PageDriver};
use crate::locator::FieldLocator;
use crate::session::SessionHandle;
use crate::site::SiteProfile;
use crate::wait::{first_of, wait_for, Signal};
use autoblog_core::config::BrowserConfig;
use autoblog_core::fail_open::fail_open;
use autoblog_core::{AutoblogError, ConfirmationSignal, PublishOutcome, PublishRequest, Result};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, info_span, warn, Instrument};
use uuid::Uuid;

/// Events fired at the composer to make a reactive page recompute whether
/// the submit control is enabled
const NUDGE_EVENTS: &[&str] = &["input", "change", "keyup", "keydown", "focus", "blur"];

/// Run states, in the order a successful run visits them
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Init,
    NavigateLogin,
    LocateIdentifierField,
    SubmitIdentifier,
    ResolveSecretField,
    SubmitSecret,
    AwaitHome,
    Compose,
    AwaitSubmitEnabled,
    LocateAndClickSubmit,
    AwaitConfirmation,
    Success,
    Cleanup,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::NavigateLogin => "NAVIGATE_LOGIN",
            Self::LocateIdentifierField => "LOCATE_IDENTIFIER_FIELD",
            Self::SubmitIdentifier => "SUBMIT_IDENTIFIER",
            Self::ResolveSecretField => "RESOLVE_SECRET_FIELD",
            Self::SubmitSecret => "SUBMIT_SECRET",
            Self::AwaitHome => "AWAIT_HOME",
            Self::Compose => "COMPOSE",
            Self::AwaitSubmitEnabled => "AWAIT_SUBMIT_ENABLED",
            Self::LocateAndClickSubmit => "LOCATE_AND_CLICK_SUBMIT",
            Self::AwaitConfirmation => "AWAIT_CONFIRMATION",
            Self::Success => "SUCCESS",
            Self::Cleanup => "CLEANUP",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Logs in to the site and publishes one post per call
#[derive(Clone)]
pub struct PublishingAutomaton {
    launcher: Arc<dyn BrowserLauncher>,
    config: BrowserConfig,
    site: SiteProfile,
}

impl PublishingAutomaton {
    pub fn new(launcher: Arc<dyn BrowserLauncher>, config: BrowserConfig) -> Self {
        Self {
            launcher,
            config,
            site: SiteProfile::default(),
        }
    }

    /// Automaton backed by a real headless Chrome
    pub fn chrome(config: BrowserConfig) -> Self {
        Self::new(Arc::new(ChromeLauncher), config)
    }

    pub fn with_site(mut self, site: SiteProfile) -> Self {
        self.site = site;
        self
    }

    pub fn config(&self) -> &BrowserConfig {
        &self.config
    }

    /// Publish `request.final_text()`.
    ///
    /// Returns `Err` only when the browser cannot be launched. The browser
    /// is released exactly once on every other path, including when this
    /// future is dropped part way.
    pub async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome> {
        let run_id = Uuid::new_v4().to_string();
        let span = info_span!("publish_run", run_id = %run_id);
        self.run(request, run_id).instrument(span).await
    }

    async fn run(&self, request: &PublishRequest, run_id: String) -> Result<PublishOutcome> {
        let final_text = request.final_text();
        info!("Publishing post ({} chars)", final_text.chars().count());

        let session = match SessionHandle::acquire(self.launcher.as_ref(), &self.config, run_id).await {
            Ok(session) => session,
            Err(e) => {
                error!("Browser launch failed: {}", e);
                return Err(e);
            }
        };

        let (result, mut trace) = {
            let mut run = Run {
                page: session.page(),
                cfg: &self.config,
                site: &self.site,
                trace: vec![RunState::Init.to_string()],
            };
            let result = run.execute(request, &final_text).await;
            (result, run.trace)
        };

        let outcome = match result {
            Ok(confirmation) => {
                trace.push(RunState::Success.to_string());
                let outcome = PublishOutcome::success(final_text).with_confirmation(confirmation);
                match confirmation {
                    Some(signal) => {
                        info!("Post confirmed via {:?}", signal);
                        outcome
                    }
                    None => {
                        warn!("No confirmation signal observed; assuming the post went through");
                        outcome.with_diagnostic(format!(
                            "post submitted but not confirmed within {} ms",
                            self.config.confirmation_wait_ms
                        ))
                    }
                }
            }
            Err(e) => {
                error!("Publish run failed at {}: {}", trace.last().map(String::as_str).unwrap_or("?"), e);
                PublishOutcome::failure(final_text, e.to_string())
            }
        };

        trace.push(RunState::Cleanup.to_string());
        session.release().await;

        Ok(outcome.with_trace(trace))
    }
}

/// State for one run; borrows the live page from its session
struct Run<'a> {
    page: &'a dyn PageDriver,
    cfg: &'a BrowserConfig,
    site: &'a SiteProfile,
    trace: Vec<String>,
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

impl<'a> Run<'a> {
    fn enter(&mut self, state: RunState) {
        debug!("Entering {}", state);
        self.trace.push(state.to_string());
    }

    fn poll(&self) -> Duration {
        ms(self.cfg.poll_interval_ms)
    }

    async fn execute(&mut self, request: &PublishRequest, final_text: &str) -> Result<Option<ConfirmationSignal>> {
        let identifier = &request.credentials.identifier;
        let secret = &request.credentials.secret;

        self.enter(RunState::NavigateLogin);
        self.navigate_login().await?;

        self.enter(RunState::LocateIdentifierField);
        let identifier_field = self
            .resolve_css(&self.site.identifier, ms(self.cfg.field_wait_ms))
            .await?;

        self.enter(RunState::SubmitIdentifier);
        self.fill_and_advance(&identifier_field, identifier, ms(self.cfg.credential_type_delay_ms))
            .await?;

        self.enter(RunState::ResolveSecretField);
        let secret_field = self.resolve_secret_field(identifier).await?;

        self.enter(RunState::SubmitSecret);
        self.submit_secret(&secret_field, secret).await?;

        self.enter(RunState::AwaitHome);
        self.await_home().await?;

        self.enter(RunState::Compose);
        let composer = self
            .resolve_css(&self.site.composer, ms(self.cfg.composer_wait_ms))
            .await?;
        self.compose(&composer, final_text).await?;

        self.enter(RunState::AwaitSubmitEnabled);
        self.await_submit_enabled(&composer).await;

        self.enter(RunState::LocateAndClickSubmit);
        self.click_submit().await?;

        self.enter(RunState::AwaitConfirmation);
        Ok(self.await_confirmation(&composer).await)
    }

    /// Load the login page, retrying the load once
    async fn navigate_login(&self) -> Result<()> {
        let timeout = ms(self.cfg.navigation_timeout_ms);
        if let Err(first) = self.page.navigate(&self.cfg.login_url, timeout).await {
            warn!("Login page load failed, retrying once: {}", first);
            self.page.navigate(&self.cfg.login_url, timeout).await?;
        }
        tokio::time::sleep(ms(self.cfg.page_settle_ms)).await;
        Ok(())
    }

    async fn resolve_css(&self, locator: &FieldLocator, per_candidate: Duration) -> Result<String> {
        let candidate = locator.resolve(self.page, per_candidate, self.poll()).await?;
        candidate
            .selector()
            .map(str::to_string)
            .ok_or_else(|| AutoblogError::not_found(locator.target()))
    }

    /// Type `value` into `selector`, then press the "next" control or Enter
    async fn fill_and_advance(&self, selector: &str, value: &str, per_char: Duration) -> Result<()> {
        self.page.focus(selector).await?;
        self.page.type_text(value, per_char).await?;
        tokio::time::sleep(ms(self.cfg.interaction_delay_ms)).await;

        let clicked = self
            .page
            .click_label(&self.site.clickable_scope, &self.site.advance_labels, None)
            .await
            .unwrap_or(false);
        if !clicked {
            debug!("No advance control found, submitting with Enter");
            self.page.press_key("Enter").await?;
        }

        tokio::time::sleep(ms(self.cfg.step_delay_ms)).await;
        Ok(())
    }

    /// Wait for the password field. When it does not show, the site may be
    /// asking to confirm the identifier first: fill that in once and wait
    /// again.
    async fn resolve_secret_field(&self, identifier: &str) -> Result<String> {
        let field_wait = ms(self.cfg.field_wait_ms);
        if let Ok(selector) = self.resolve_css(&self.site.secret, field_wait).await {
            return Ok(selector);
        }

        warn!("Password field did not appear; checking for an identifier confirmation step");
        match self
            .resolve_css(&self.site.identifier_confirmation, ms(self.cfg.confirm_field_wait_ms))
            .await
        {
            Ok(confirm_field) => {
                info!("Identifier confirmation step detected");
                self.fill_and_advance(&confirm_field, identifier, ms(self.cfg.compose_type_delay_ms))
                    .await?;
            }
            Err(_) => debug!("No identifier confirmation field either"),
        }

        self.resolve_css(&self.site.secret, field_wait).await
    }

    async fn submit_secret(&self, selector: &str, secret: &str) -> Result<()> {
        self.page.focus(selector).await?;
        self.page
            .type_text(secret, ms(self.cfg.credential_type_delay_ms))
            .await?;
        tokio::time::sleep(ms(self.cfg.interaction_delay_ms)).await;

        let clicked = self
            .page
            .click_label(&self.site.clickable_scope, &self.site.login_labels, None)
            .await
            .unwrap_or(false);
        if !clicked {
            debug!("No login control found, submitting with Enter");
            self.page.press_key("Enter").await?;
        }
        Ok(())
    }

    /// Any composer candidate appearing counts as the home timeline loaded
    async fn await_home(&self) -> Result<()> {
        let budget = ms(self.cfg.home_wait_ms);
        let poll = self.poll();
        let page = self.page;

        let signals = self
            .site
            .composer
            .candidates()
            .iter()
            .filter_map(|c| c.selector())
            .map(|selector| {
                Signal::new("composer", budget, async move {
                    wait_for(poll, budget, move || page.exists(selector))
                        .await
                        .then(|| selector.to_string())
                })
            })
            .collect();

        match first_of(signals).await {
            Some((_, selector)) => {
                info!("Logged in; composer present ({})", selector);
                Ok(())
            }
            None => Err(AutoblogError::Timeout("home/composer did not load".to_string())),
        }
    }

    /// Type the post in chunks, telling the page about each chunk
    async fn compose(&self, composer: &str, text: &str) -> Result<()> {
        self.page.click(composer).await?;
        tokio::time::sleep(ms(self.cfg.interaction_delay_ms)).await;
        self.page.clear(composer).await?;

        let chars: Vec<char> = text.chars().collect();
        let chunk_size = self.cfg.notify_every_chars.max(1);
        let per_char = ms(self.cfg.compose_type_delay_ms);

        for chunk in chars.chunks(chunk_size) {
            let chunk: String = chunk.iter().collect();
            self.page.type_text(&chunk, per_char).await?;
            fail_open("input notification", || {
                self.page.dispatch_events(composer, &["input", "change"])
            })
            .await;
        }

        debug!("Composed {} chars", chars.len());
        Ok(())
    }

    /// Poke the composer until a submit candidate looks enabled. Never fails.
    async fn await_submit_enabled(&self, composer: &str) {
        fail_open("composer click", || self.page.click(composer)).await;
        fail_open("composer events", || self.page.dispatch_events(composer, NUDGE_EVENTS)).await;
        fail_open("composer focus", || self.page.focus(composer)).await;
        for key in ["End", "ArrowLeft", "ArrowRight"] {
            fail_open("cursor nudge", || self.page.press_key(key)).await;
        }

        let enabled = wait_for(self.poll(), ms(self.cfg.submit_settle_ms), move || async move {
            for candidate in self.site.submit.candidates() {
                if let Some(selector) = candidate.selector() {
                    if self.page.is_enabled(selector, &self.site.enabled_colours).await? {
                        return Ok(true);
                    }
                }
            }
            Ok::<_, AutoblogError>(false)
        })
        .await;

        if !enabled {
            warn!("Submit control still looks disabled; trying anyway");
        }
    }

    /// Click the first enabled submit candidate, falling back to a label scan
    async fn click_submit(&self) -> Result<()> {
        let budget = ms(self.cfg.submit_wait_ms);
        let colours: &[String] = &self.site.enabled_colours;

        for candidate in self.site.submit.candidates() {
            let Some(selector) = candidate.selector() else {
                continue;
            };

            let ready = wait_for(self.poll(), budget, move || async move {
                Ok::<_, AutoblogError>(
                    self.page.exists(selector).await? && self.page.is_enabled(selector, colours).await?,
                )
            })
            .await;
            if !ready {
                debug!("Submit candidate {} not enabled", selector);
                continue;
            }

            match self.page.click(selector).await {
                Ok(()) => {
                    info!("Clicked submit ({})", selector);
                    return Ok(());
                }
                Err(e) => {
                    warn!("Direct click on {} failed ({}); trying synthetic click", selector, e);
                    if self.page.synthetic_click(selector).await.unwrap_or(false) {
                        info!("Clicked submit via synthetic click ({})", selector);
                        return Ok(());
                    }
                }
            }
        }

        warn!("No submit candidate clicked; scanning for a labelled control");
        let clicked = self
            .page
            .click_label(&self.site.clickable_scope, &self.site.submit_labels, Some(colours))
            .await
            .unwrap_or(false);
        if clicked {
            info!("Clicked submit via label scan");
            Ok(())
        } else {
            Err(AutoblogError::not_found("enabled submit control"))
        }
    }

    /// Race the toast against the composer emptying
    async fn await_confirmation(&self, composer: &str) -> Option<ConfirmationSignal> {
        let budget = ms(self.cfg.confirmation_wait_ms);
        let poll = self.poll();
        let page = self.page;
        let toast = self.site.toast.as_str();

        let signals = vec![
            Signal::new("toast", budget, async move {
                wait_for(poll, budget, move || page.exists(toast))
                    .await
                    .then_some(ConfirmationSignal::Toast)
            }),
            Signal::new("composer_cleared", budget, async move {
                wait_for(poll, budget, move || async move {
                    let text = page.text_content(composer).await?;
                    Ok::<_, AutoblogError>(text.map_or(true, |t| t.trim().is_empty()))
                })
                .await
                .then_some(ConfirmationSignal::ComposerCleared)
            }),
        ];

        first_of(signals).await.map(|(label, signal)| {
            debug!("Confirmation signal: {}", label);
            signal
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_state_names() {
        assert_eq!(RunState::ResolveSecretField.to_string(), "RESOLVE_SECRET_FIELD");
        assert_eq!(RunState::LocateAndClickSubmit.as_str(), "LOCATE_AND_CLICK_SUBMIT");
    }

    #[test]
    fn test_nudge_events_include_keyboard() {
        assert!(NUDGE_EVENTS.contains(&"keyup"));
        assert!(NUDGE_EVENTS.contains(&"input"));
    }
}

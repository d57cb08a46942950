//! Publish runs against a scripted page

use async_trait::async_trait;
use autoblog_browser::{BrowserLauncher, PageDriver, PublishingAutomaton};
use autoblog_core::config::BrowserConfig;
use autoblog_core::{AutoblogError, ConfirmationSignal, Credentials, PublishRequest, Result};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

const IDENTIFIER: &str = r#"input[name="text"]"#;
const CONFIRMATION: &str = r#"input[data-testid="ocfEnterTextTextInput"]"#;
const PASSWORD: &str = r#"input[name="password"]"#;
const COMPOSER: &str = r#"[data-testid="tweetTextarea_0"]"#;
const SUBMIT: &str = r#"button[data-testid="tweetButton"]"#;
const TOAST: &str = r#"div[data-testid="toast"]"#;

const SECRET: &str = "correct horse battery staple";

/// How the fake site behaves
#[derive(Clone)]
struct Scenario {
    nav_failures: usize,
    identifier_present: bool,
    confirmation_present: bool,
    password_initially: bool,
    password_after_confirmation: bool,
    submit_enabled: bool,
    native_click_fails: bool,
    toast_on_submit: bool,
    clear_on_submit: bool,
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            nav_failures: 0,
            identifier_present: true,
            confirmation_present: false,
            password_initially: true,
            password_after_confirmation: false,
            submit_enabled: true,
            native_click_fails: false,
            toast_on_submit: true,
            clear_on_submit: false,
        }
    }
}

#[derive(Default)]
struct SiteState {
    nav_calls: usize,
    focused: String,
    /// (field, text) per type_text call
    typed: Vec<(String, String)>,
    composer_text: String,
    confirmed: bool,
    logged_in: bool,
    submitted: bool,
    synthetic_clicks: usize,
}

struct FakePage {
    scenario: Scenario,
    state: Arc<Mutex<SiteState>>,
    releases: Arc<AtomicUsize>,
}

impl FakePage {
    fn password_visible(&self, state: &SiteState) -> bool {
        self.scenario.password_initially || (state.confirmed && self.scenario.password_after_confirmation)
    }
}

#[async_trait]
impl PageDriver for FakePage {
    async fn navigate(&self, _url: &str, _timeout: Duration) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.nav_calls += 1;
        if state.nav_calls <= self.scenario.nav_failures {
            return Err(AutoblogError::Browser("net::ERR_CONNECTION_RESET".to_string()));
        }
        Ok(())
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        let state = self.state.lock().unwrap();
        Ok(match selector {
            IDENTIFIER => self.scenario.identifier_present,
            CONFIRMATION => self.scenario.confirmation_present,
            PASSWORD => self.password_visible(&state),
            COMPOSER => state.logged_in && !(state.submitted && self.scenario.clear_on_submit),
            SUBMIT => state.logged_in,
            TOAST => state.submitted && self.scenario.toast_on_submit,
            _ => false,
        })
    }

    async fn label_exists(&self, _scope: &str, _labels: &[String], _colours: Option<&[String]>) -> Result<bool> {
        Ok(false)
    }

    async fn click_label(&self, _scope: &str, labels: &[String], _colours: Option<&[String]>) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        if labels.iter().any(|l| l == "log in") {
            state.logged_in = true;
            return Ok(true);
        }
        if labels.iter().any(|l| l == "next") {
            if state.focused == CONFIRMATION {
                state.confirmed = true;
            }
            return Ok(true);
        }
        Ok(false)
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        if selector == SUBMIT {
            if self.scenario.native_click_fails {
                return Err(AutoblogError::Browser("node is detached".to_string()));
            }
            state.submitted = true;
        }
        state.focused = selector.to_string();
        Ok(())
    }

    async fn synthetic_click(&self, selector: &str) -> Result<bool> {
        let mut state = self.state.lock().unwrap();
        state.synthetic_clicks += 1;
        if selector == SUBMIT {
            state.submitted = true;
        }
        Ok(true)
    }

    async fn focus(&self, selector: &str) -> Result<()> {
        self.state.lock().unwrap().focused = selector.to_string();
        Ok(())
    }

    async fn clear(&self, selector: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.focused = selector.to_string();
        state.composer_text.clear();
        Ok(())
    }

    async fn type_text(&self, text: &str, _per_char_delay: Duration) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        let field = state.focused.clone();
        if field == COMPOSER {
            state.composer_text.push_str(text);
        }
        state.typed.push((field, text.to_string()));
        Ok(())
    }

    async fn press_key(&self, _key: &str) -> Result<()> {
        Ok(())
    }

    async fn dispatch_events(&self, _selector: &str, _events: &[&str]) -> Result<()> {
        Ok(())
    }

    async fn is_enabled(&self, selector: &str, _colours: &[String]) -> Result<bool> {
        Ok(selector == SUBMIT && self.scenario.submit_enabled)
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>> {
        let state = self.state.lock().unwrap();
        if selector != COMPOSER {
            return Ok(None);
        }
        if state.submitted && self.scenario.clear_on_submit {
            return Ok(Some(String::new()));
        }
        Ok(Some(state.composer_text.clone()))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        self.releases.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct FakeLauncher {
    scenario: Scenario,
    state: Arc<Mutex<SiteState>>,
    releases: Arc<AtomicUsize>,
    fail_launch: bool,
}

#[async_trait]
impl BrowserLauncher for FakeLauncher {
    async fn launch(&self, _config: &BrowserConfig) -> Result<Box<dyn PageDriver>> {
        if self.fail_launch {
            // The process started but never produced a page; tear it down.
            self.releases.fetch_add(1, Ordering::SeqCst);
            return Err(AutoblogError::BrowserLaunch("chrome exited with status 127".to_string()));
        }
        Ok(Box::new(FakePage {
            scenario: self.scenario.clone(),
            state: Arc::clone(&self.state),
            releases: Arc::clone(&self.releases),
        }))
    }
}

struct Harness {
    automaton: PublishingAutomaton,
    state: Arc<Mutex<SiteState>>,
    releases: Arc<AtomicUsize>,
}

fn fast_config() -> BrowserConfig {
    BrowserConfig {
        navigation_timeout_ms: 100,
        page_settle_ms: 0,
        field_wait_ms: 30,
        confirm_field_wait_ms: 20,
        home_wait_ms: 50,
        composer_wait_ms: 20,
        submit_wait_ms: 20,
        step_delay_ms: 0,
        interaction_delay_ms: 0,
        submit_settle_ms: 20,
        confirmation_wait_ms: 50,
        credential_type_delay_ms: 0,
        compose_type_delay_ms: 0,
        poll_interval_ms: 1,
        ..BrowserConfig::default()
    }
}

fn harness(scenario: Scenario) -> Harness {
    harness_with(scenario, fast_config(), false)
}

fn harness_with(scenario: Scenario, config: BrowserConfig, fail_launch: bool) -> Harness {
    let state = Arc::new(Mutex::new(SiteState::default()));
    let releases = Arc::new(AtomicUsize::new(0));
    let launcher = FakeLauncher {
        scenario,
        state: Arc::clone(&state),
        releases: Arc::clone(&releases),
        fail_launch,
    };
    Harness {
        automaton: PublishingAutomaton::new(Arc::new(launcher), config),
        state,
        releases,
    }
}

fn request() -> PublishRequest {
    PublishRequest::new("Fresh brew tips ☕ [LINK] #coffee", Credentials::new("brewer", SECRET))
        .with_link(Some("https://yourblog.com/blogs/7".to_string()))
}

#[tokio::test]
async fn test_happy_path_confirmed_by_toast() {
    let h = harness(Scenario::default());

    let outcome = h.automaton.publish(&request()).await.unwrap();

    assert!(outcome.succeeded, "{:?}", outcome.diagnostic);
    assert_eq!(outcome.confirmation, Some(ConfirmationSignal::Toast));
    assert_eq!(outcome.final_text, "Fresh brew tips ☕ https://yourblog.com/blogs/7 #coffee");
    assert_eq!(
        outcome.trace,
        vec![
            "INIT",
            "NAVIGATE_LOGIN",
            "LOCATE_IDENTIFIER_FIELD",
            "SUBMIT_IDENTIFIER",
            "RESOLVE_SECRET_FIELD",
            "SUBMIT_SECRET",
            "AWAIT_HOME",
            "COMPOSE",
            "AWAIT_SUBMIT_ENABLED",
            "LOCATE_AND_CLICK_SUBMIT",
            "AWAIT_CONFIRMATION",
            "SUCCESS",
            "CLEANUP",
        ]
    );

    let state = h.state.lock().unwrap();
    assert_eq!(state.composer_text, outcome.final_text);
    assert_eq!(state.synthetic_clicks, 0);
    assert_eq!(h.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_composer_typed_in_chunks() {
    let h = harness(Scenario::default());
    h.automaton.publish(&request()).await.unwrap();

    let state = h.state.lock().unwrap();
    let chunks: Vec<&String> = state
        .typed
        .iter()
        .filter(|(field, _)| field == COMPOSER)
        .map(|(_, text)| text)
        .collect();
    assert!(chunks.len() > 1);
    assert!(chunks.iter().all(|c| c.chars().count() <= 10));
}

#[tokio::test]
async fn test_password_never_appears_retries_once() {
    let h = harness(Scenario {
        password_initially: false,
        confirmation_present: true,
        password_after_confirmation: false,
        ..Scenario::default()
    });

    let outcome = h.automaton.publish(&request()).await.unwrap();

    assert!(!outcome.succeeded);
    let diagnostic = outcome.diagnostic.clone().unwrap();
    assert!(diagnostic.contains("password field"), "{}", diagnostic);
    assert!(!diagnostic.contains(SECRET));

    let state = h.state.lock().unwrap();
    let identifier_entries = state.typed.iter().filter(|(_, text)| text == "brewer").count();
    assert_eq!(identifier_entries, 2);
    assert!(state.typed.iter().all(|(_, text)| text != SECRET));
    assert_eq!(outcome.trace.last().map(String::as_str), Some("CLEANUP"));
    assert_eq!(h.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_confirmation_step_recovers() {
    let h = harness(Scenario {
        password_initially: false,
        confirmation_present: true,
        password_after_confirmation: true,
        ..Scenario::default()
    });

    let outcome = h.automaton.publish(&request()).await.unwrap();

    assert!(outcome.succeeded, "{:?}", outcome.diagnostic);
    let state = h.state.lock().unwrap();
    assert!(state.confirmed);
    assert!(state.typed.iter().any(|(field, text)| field == PASSWORD && text == SECRET));
}

#[tokio::test]
async fn test_missing_identifier_field() {
    let h = harness(Scenario {
        identifier_present: false,
        ..Scenario::default()
    });

    let outcome = h.automaton.publish(&request()).await.unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.diagnostic.as_deref(), Some("input field not found"));
    assert_eq!(
        outcome.trace,
        vec!["INIT", "NAVIGATE_LOGIN", "LOCATE_IDENTIFIER_FIELD", "CLEANUP"]
    );
    assert_eq!(h.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_launch_failure_is_fatal_and_released_once() {
    let h = harness_with(Scenario::default(), fast_config(), true);

    let err = h.automaton.publish(&request()).await.unwrap_err();

    assert!(err.is_fatal());
    assert_eq!(err.code(), "LAUNCH_FAILED");
    assert_eq!(h.releases.load(Ordering::SeqCst), 1);
    assert_eq!(h.state.lock().unwrap().nav_calls, 0);
}

#[tokio::test]
async fn test_navigation_retried_once() {
    let h = harness(Scenario {
        nav_failures: 1,
        ..Scenario::default()
    });
    let outcome = h.automaton.publish(&request()).await.unwrap();
    assert!(outcome.succeeded);
    assert_eq!(h.state.lock().unwrap().nav_calls, 2);

    let h = harness(Scenario {
        nav_failures: 2,
        ..Scenario::default()
    });
    let outcome = h.automaton.publish(&request()).await.unwrap();
    assert!(!outcome.succeeded);
    assert_eq!(h.state.lock().unwrap().nav_calls, 2);
    assert_eq!(h.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_disabled_submit_fails() {
    let h = harness(Scenario {
        submit_enabled: false,
        ..Scenario::default()
    });

    let outcome = h.automaton.publish(&request()).await.unwrap();

    assert!(!outcome.succeeded);
    assert_eq!(outcome.diagnostic.as_deref(), Some("enabled submit control not found"));
    assert!(!h.state.lock().unwrap().submitted);
    assert_eq!(h.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_synthetic_click_fallback() {
    let h = harness(Scenario {
        native_click_fails: true,
        ..Scenario::default()
    });

    let outcome = h.automaton.publish(&request()).await.unwrap();

    assert!(outcome.succeeded);
    assert_eq!(h.state.lock().unwrap().synthetic_clicks, 1);
}

#[tokio::test]
async fn test_composer_cleared_confirms() {
    let h = harness(Scenario {
        toast_on_submit: false,
        clear_on_submit: true,
        ..Scenario::default()
    });

    let outcome = h.automaton.publish(&request()).await.unwrap();

    assert!(outcome.succeeded);
    assert_eq!(outcome.confirmation, Some(ConfirmationSignal::ComposerCleared));
}

#[tokio::test]
async fn test_unconfirmed_post_is_best_effort_success() {
    let h = harness(Scenario {
        toast_on_submit: false,
        clear_on_submit: false,
        ..Scenario::default()
    });

    let outcome = h.automaton.publish(&request()).await.unwrap();

    assert!(outcome.succeeded);
    assert!(outcome.is_best_effort());
    assert!(outcome.diagnostic.unwrap().contains("not confirmed"));
    assert_eq!(h.releases.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_placeholder_kept_without_link() {
    let h = harness(Scenario::default());
    let request = PublishRequest::new("Read it: [LINK]", Credentials::new("brewer", SECRET));

    let outcome = h.automaton.publish(&request).await.unwrap();

    assert_eq!(outcome.final_text, "Read it: [LINK]");
    assert_eq!(h.state.lock().unwrap().composer_text, "Read it: [LINK]");
}

#[tokio::test]
async fn test_cancelled_run_still_releases_once() {
    let config = BrowserConfig {
        confirmation_wait_ms: 10_000,
        ..fast_config()
    };
    let h = harness_with(
        Scenario {
            toast_on_submit: false,
            ..Scenario::default()
        },
        config,
        false,
    );

    let automaton = h.automaton.clone();
    let run = tokio::spawn(async move { automaton.publish(&request()).await });

    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(h.state.lock().unwrap().submitted, "run should be waiting for confirmation");
    assert_eq!(h.releases.load(Ordering::SeqCst), 0);

    run.abort();
    assert!(run.await.unwrap_err().is_cancelled());
    tokio::time::sleep(Duration::from_millis(20)).await;

    assert_eq!(h.releases.load(Ordering::SeqCst), 1);
}

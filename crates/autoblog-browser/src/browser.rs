//! Chrome-backed [`PageDriver`] using the Chrome DevTools Protocol

use crate::driver::{BrowserLauncher, PageDriver};
use crate::scripts;
use async_trait::async_trait;
use autoblog_core::config::BrowserConfig;
use autoblog_core::{AutoblogError, Result};
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Flags every automation browser is started with
const LAUNCH_ARGS: &[&str] = &[
    "--disable-setuid-sandbox",
    "--disable-dev-shm-usage",
    "--disable-gpu",
    "--no-first-run",
    "--no-zygote",
    "--disable-blink-features=AutomationControlled",
];

/// Launches a fresh headless Chrome per run
#[derive(Debug, Clone, Default)]
pub struct ChromeLauncher;

#[async_trait]
impl BrowserLauncher for ChromeLauncher {
    async fn launch(&self, config: &BrowserConfig) -> Result<Box<dyn PageDriver>> {
        let config = config.clone();
        let page = tokio::task::spawn_blocking(move || ChromePage::start(&config))
            .await
            .map_err(|e| AutoblogError::BrowserLaunch(format!("launch task failed: {}", e)))??;
        Ok(Box::new(page))
    }
}

/// One browser process and its single tab
pub struct ChromePage {
    browser: Browser,
    tab: Arc<Tab>,
}

impl ChromePage {
    /// Blocking launch. A browser that started but whose tab could not be
    /// prepared is dropped here, which kills the process.
    fn start(config: &BrowserConfig) -> Result<Self> {
        info!(
            "Launching browser (headless: {}, size: {}x{})",
            config.headless, config.window_width, config.window_height
        );

        let launch_options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .window_size(Some((config.window_width, config.window_height)))
            .args(LAUNCH_ARGS.iter().map(OsStr::new).collect())
            .build()
            .map_err(|e| AutoblogError::BrowserLaunch(format!("invalid launch options: {}", e)))?;

        let browser = Browser::new(launch_options)
            .map_err(|e| AutoblogError::BrowserLaunch(format!("Failed to launch browser: {}", e)))?;

        let tab = browser
            .new_tab()
            .map_err(|e| AutoblogError::BrowserLaunch(format!("Failed to create tab: {}", e)))?;

        tab.set_user_agent(&config.user_agent, Some("en-US,en;q=0.9"), None)
            .map_err(|e| AutoblogError::BrowserLaunch(format!("Failed to set user agent: {}", e)))?;
        tab.enable_stealth_mode()
            .map_err(|e| AutoblogError::BrowserLaunch(format!("Failed to enable stealth mode: {}", e)))?;
        tab.set_default_timeout(Duration::from_millis(config.navigation_timeout_ms));

        info!("Browser launched successfully");
        Ok(Self { browser, tab })
    }

    /// Run a blocking tab operation off the async runtime
    async fn with_tab<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Tab) -> Result<T> + Send + 'static,
    {
        let tab = Arc::clone(&self.tab);
        tokio::task::spawn_blocking(move || f(&tab))
            .await
            .map_err(|e| AutoblogError::Browser(format!("tab task failed: {}", e)))?
    }

    async fn eval(&self, script: String) -> Result<serde_json::Value> {
        self.with_tab(move |tab| {
            let result = tab
                .evaluate(&script, false)
                .map_err(|e| AutoblogError::Browser(format!("JavaScript evaluation failed: {}", e)))?;
            Ok(result.value.unwrap_or(serde_json::Value::Null))
        })
        .await
    }

    async fn eval_bool(&self, script: String) -> Result<bool> {
        Ok(self.eval(script).await?.as_bool().unwrap_or(false))
    }
}

#[async_trait]
impl PageDriver for ChromePage {
    async fn navigate(&self, url: &str, timeout: Duration) -> Result<()> {
        debug!("Navigating to {}", url);
        let target = url.to_string();
        let load = self.with_tab(move |tab| {
            tab.navigate_to(&target)
                .and_then(|t| t.wait_until_navigated())
                .map(|_| ())
                .map_err(|e| AutoblogError::Browser(format!("Failed to navigate to {}: {}", target, e)))
        });

        match tokio::time::timeout(timeout, load).await {
            Ok(result) => result,
            Err(_) => Err(AutoblogError::Timeout(format!("navigation to {} exceeded {:?}", url, timeout))),
        }
    }

    async fn exists(&self, selector: &str) -> Result<bool> {
        self.eval_bool(scripts::exists(selector)).await
    }

    async fn label_exists(
        &self,
        scope: &str,
        labels: &[String],
        enabled_colours: Option<&[String]>,
    ) -> Result<bool> {
        self.eval_bool(scripts::label_scan(scope, labels, enabled_colours, false))
            .await
    }

    async fn click_label(
        &self,
        scope: &str,
        labels: &[String],
        enabled_colours: Option<&[String]>,
    ) -> Result<bool> {
        self.eval_bool(scripts::label_scan(scope, labels, enabled_colours, true))
            .await
    }

    async fn click(&self, selector: &str) -> Result<()> {
        let selector = selector.to_string();
        self.with_tab(move |tab| {
            tab.find_element(&selector)
                .and_then(|el| el.click().map(|_| ()))
                .map_err(|e| AutoblogError::Browser(format!("click on {} failed: {}", selector, e)))
        })
        .await
    }

    async fn synthetic_click(&self, selector: &str) -> Result<bool> {
        self.eval_bool(scripts::synthetic_click(selector)).await
    }

    async fn focus(&self, selector: &str) -> Result<()> {
        let selector = selector.to_string();
        self.with_tab(move |tab| {
            tab.find_element(&selector)
                .and_then(|el| el.focus().map(|_| ()))
                .map_err(|e| AutoblogError::Browser(format!("focus on {} failed: {}", selector, e)))
        })
        .await
    }

    async fn clear(&self, selector: &str) -> Result<()> {
        if self.eval_bool(scripts::clear(selector)).await? {
            Ok(())
        } else {
            Err(AutoblogError::not_found(selector))
        }
    }

    async fn type_text(&self, text: &str, per_char_delay: Duration) -> Result<()> {
        for ch in text.chars() {
            let key = ch.to_string();
            self.with_tab(move |tab| {
                tab.type_str(&key)
                    .map(|_| ())
                    .map_err(|e| AutoblogError::Browser(format!("typing failed: {}", e)))
            })
            .await?;
            if !per_char_delay.is_zero() {
                tokio::time::sleep(per_char_delay).await;
            }
        }
        Ok(())
    }

    async fn press_key(&self, key: &str) -> Result<()> {
        let key = key.to_string();
        self.with_tab(move |tab| {
            tab.press_key(&key)
                .map(|_| ())
                .map_err(|e| AutoblogError::Browser(format!("key {} failed: {}", key, e)))
        })
        .await
    }

    async fn dispatch_events(&self, selector: &str, events: &[&str]) -> Result<()> {
        self.eval(scripts::dispatch_events(selector, events)).await?;
        Ok(())
    }

    async fn is_enabled(&self, selector: &str, enabled_colours: &[String]) -> Result<bool> {
        self.eval_bool(scripts::is_enabled(selector, enabled_colours))
            .await
    }

    async fn text_content(&self, selector: &str) -> Result<Option<String>> {
        let value = self.eval(scripts::text_content(selector)).await?;
        Ok(value.as_str().map(str::to_string))
    }

    async fn close(self: Box<Self>) -> Result<()> {
        info!("Closing browser session");
        let ChromePage { browser, tab } = *self;
        tokio::task::spawn_blocking(move || {
            if let Err(e) = tab.close(false) {
                debug!("Tab close failed (browser will still be killed): {}", e);
            }
            // Dropping the last handle kills the process.
            drop(browser);
        })
        .await
        .map_err(|e| AutoblogError::Browser(format!("close task failed: {}", e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_args_hide_automation() {
        assert!(LAUNCH_ARGS.contains(&"--disable-blink-features=AutomationControlled"));
        assert!(LAUNCH_ARGS.contains(&"--disable-dev-shm-usage"));
    }

    #[tokio::test]
    #[ignore] // Requires Chrome/Chromium to be installed
    async fn test_launch_and_probe() {
        let launcher = ChromeLauncher;
        let page = launcher.launch(&BrowserConfig::default()).await.unwrap();
        page.navigate("about:blank", Duration::from_secs(10)).await.unwrap();
        assert!(page.exists("body").await.unwrap());
        assert!(!page.exists("#missing").await.unwrap());
        page.close().await.unwrap();
    }
}

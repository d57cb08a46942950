//! Scoped ownership of one launched browser

use crate::driver::{BrowserLauncher, PageDriver};
use autoblog_core::config::BrowserConfig;
use autoblog_core::{AutoblogError, Result};
use tracing::{debug, warn};

/// Owns the page for the length of a run and releases it exactly once.
///
/// Call [`release`](SessionHandle::release) on every normal exit. If the
/// handle is dropped without it (the run future was cancelled, or a panic
/// unwound through it) the close is spawned onto the runtime from `Drop`.
pub struct SessionHandle {
    page: Option<Box<dyn PageDriver>>,
    run_id: String,
}

impl SessionHandle {
    /// Launch a browser for `run_id`. Launch failures are always reported
    /// as `BrowserLaunch`.
    pub async fn acquire(
        launcher: &dyn BrowserLauncher,
        config: &BrowserConfig,
        run_id: impl Into<String>,
    ) -> Result<Self> {
        let run_id = run_id.into();
        let page = launcher.launch(config).await.map_err(|e| match e {
            AutoblogError::BrowserLaunch(_) => e,
            other => AutoblogError::BrowserLaunch(other.to_string()),
        })?;
        debug!(run_id = %run_id, "Session acquired");
        Ok(Self {
            page: Some(page),
            run_id,
        })
    }

    /// The live page. Only `None` after release, which consumes the handle,
    /// so callers never observe it.
    pub fn page(&self) -> &dyn PageDriver {
        match &self.page {
            Some(page) => page.as_ref(),
            None => unreachable!("session used after release"),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    /// Close the browser. Errors are logged, not returned: the run's result
    /// is already decided by the time cleanup happens.
    pub async fn release(mut self) {
        if let Some(page) = self.page.take() {
            if let Err(e) = page.close().await {
                warn!(run_id = %self.run_id, "Browser close failed: {}", e);
            }
            debug!(run_id = %self.run_id, "Session released");
        }
    }
}

impl Drop for SessionHandle {
    fn drop(&mut self) {
        let Some(page) = self.page.take() else {
            return;
        };
        let run_id = std::mem::take(&mut self.run_id);
        warn!(run_id = %run_id, "Session dropped without release; closing in background");
        match tokio::runtime::Handle::try_current() {
            Ok(handle) => {
                handle.spawn(async move {
                    if let Err(e) = page.close().await {
                        warn!(run_id = %run_id, "Browser close failed: {}", e);
                    }
                });
            }
            // No runtime left: dropping the driver still drops the browser
            // process handle.
            Err(_) => drop(page),
        }
    }
}

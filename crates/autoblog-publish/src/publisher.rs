//! The posting seam and the admission limit in front of it

use async_trait::async_trait;
use autoblog_browser::PublishingAutomaton;
use autoblog_core::config::PublishConfig;
use autoblog_core::{AutoblogError, PublishOutcome, PublishRequest, Result};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

/// Anything that can publish a post for a request
#[async_trait]
pub trait Publisher: Send + Sync {
    /// `Err` is reserved for fatal environment failures; everything else
    /// comes back as a failed outcome.
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome>;
}

#[async_trait]
impl Publisher for PublishingAutomaton {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome> {
        PublishingAutomaton::publish(self, request).await
    }
}

#[async_trait]
impl<P: Publisher + ?Sized> Publisher for Arc<P> {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome> {
        (**self).publish(request).await
    }
}

/// Caps how many publishes run at once
///
/// Each browser run is a full Chrome process. Callers past the cap wait up
/// to `wait` for a slot, then get a failed "publisher busy" outcome.
pub struct AdmissionControl<P> {
    inner: P,
    permits: Arc<Semaphore>,
    wait: Duration,
}

impl<P: Publisher> AdmissionControl<P> {
    pub fn new(inner: P, max_concurrent: usize, wait: Duration) -> Self {
        Self {
            inner,
            permits: Arc::new(Semaphore::new(max_concurrent.max(1))),
            wait,
        }
    }

    pub fn from_config(inner: P, config: &PublishConfig) -> Self {
        Self::new(inner, config.max_concurrent_runs, config.admission_wait())
    }

    /// Free slots right now
    pub fn available(&self) -> usize {
        self.permits.available_permits()
    }
}

#[async_trait]
impl<P: Publisher> Publisher for AdmissionControl<P> {
    async fn publish(&self, request: &PublishRequest) -> Result<PublishOutcome> {
        let permit = match tokio::time::timeout(self.wait, self.permits.acquire()).await {
            Ok(Ok(permit)) => permit,
            Ok(Err(_)) => return Err(AutoblogError::Other("publisher is shut down".to_string())),
            Err(_) => {
                warn!("No publish slot free within {:?}", self.wait);
                return Ok(PublishOutcome::failure(
                    request.final_text(),
                    format!("publisher busy: no free slot within {} s", self.wait.as_secs()),
                ));
            }
        };

        debug!("Publish slot acquired ({} left)", self.permits.available_permits());
        let result = self.inner.publish(request).await;
        drop(permit);
        result
    }
}

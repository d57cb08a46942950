//! Store the article, then optionally post its promo

use crate::publisher::Publisher;
use crate::store::BlogStore;
use autoblog_core::config::PublishConfig;
use autoblog_core::{BlogDraft, BlogRecord, Credentials, PublishOutcome, PublishRequest, Result};
use serde::Serialize;
use std::sync::Arc;
use tracing::{error, info, warn};

/// Aggregated result of [`PublishOrchestrator::publish_both`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublishReport {
    pub blog_saved: bool,
    pub blog: BlogRecord,
    /// `None` when posting was not attempted
    pub automation: Option<PublishOutcome>,
}

impl PublishReport {
    /// Posting was attempted and did not succeed
    pub fn automation_failed(&self) -> bool {
        self.automation.as_ref().is_some_and(|o| !o.succeeded)
    }
}

/// Pairs the blog store with a publisher
#[derive(Clone)]
pub struct PublishOrchestrator {
    store: Arc<dyn BlogStore>,
    publisher: Arc<dyn Publisher>,
    config: PublishConfig,
}

impl PublishOrchestrator {
    pub fn new(store: Arc<dyn BlogStore>, publisher: Arc<dyn Publisher>, config: PublishConfig) -> Self {
        Self {
            store,
            publisher,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn BlogStore> {
        &self.store
    }

    pub fn publisher(&self) -> &Arc<dyn Publisher> {
        &self.publisher
    }

    pub fn config(&self) -> &PublishConfig {
        &self.config
    }

    /// Persist `draft`, then post `tweet_text` with its link when asked to.
    ///
    /// A storage failure is returned as `Err` and nothing is posted.
    /// Skipping the post (disabled, blank text, or no usable credentials) is
    /// a normal result with `automation: None`. Posting failures of any kind,
    /// including text over the post limit, land in `automation` and never
    /// fail the call.
    pub async fn publish_both(
        &self,
        draft: BlogDraft,
        tweet_text: &str,
        auto_post: bool,
        credentials: Option<Credentials>,
    ) -> Result<PublishReport> {
        let draft = if draft.tweet.is_none() && !tweet_text.trim().is_empty() {
            draft.with_tweet(tweet_text)
        } else {
            draft
        };

        let blog = match self.store.create(draft).await {
            Ok(blog) => blog,
            Err(e) => {
                error!("Saving blog failed; not posting: {}", e);
                return Err(e);
            }
        };

        let credentials = match (auto_post, credentials) {
            (false, _) => {
                info!("Auto-post disabled; blog {} saved only", blog.id);
                None
            }
            (true, _) if tweet_text.trim().is_empty() => {
                info!("No post text; blog {} saved only", blog.id);
                None
            }
            (true, Some(creds)) if creds.is_complete() => Some(creds),
            (true, _) => {
                info!("No credentials supplied; blog {} saved only", blog.id);
                None
            }
        };

        let Some(credentials) = credentials else {
            return Ok(PublishReport {
                blog_saved: true,
                blog,
                automation: None,
            });
        };

        let request = PublishRequest::new(tweet_text, credentials)
            .with_placeholder(self.config.link_placeholder.clone())
            .with_link(Some(self.config.blog_link(blog.id)));

        let outcome = match request.validate() {
            Ok(()) => match self.publisher.publish(&request).await {
                Ok(outcome) => outcome,
                Err(e) => {
                    warn!("Posting blog {} failed before it started: {}", blog.id, e);
                    PublishOutcome::failure(request.final_text(), e.to_string())
                }
            },
            Err(e) => PublishOutcome::failure(request.final_text(), e.to_string()),
        };

        if outcome.succeeded {
            info!("Blog {} saved and posted", blog.id);
        } else {
            warn!(
                "Blog {} saved; posting failed: {}",
                blog.id,
                outcome.diagnostic.as_deref().unwrap_or("unknown")
            );
        }

        Ok(PublishReport {
            blog_saved: true,
            blog,
            automation: Some(outcome),
        })
    }
}

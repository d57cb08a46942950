//! Shared application state

use crate::rate_limit::RateLimiter;
use autoblog_browser::PublishingAutomaton;
use autoblog_content::{ContentGenerator, GeminiClient, TextModel};
use autoblog_core::config::ServerConfig;
use autoblog_core::AutoblogConfig;
use autoblog_publish::{AdmissionControl, InMemoryBlogStore, PublishOrchestrator};
use std::sync::Arc;
use tracing::{info, warn};

/// Generator over any boxed text model
pub type SharedGenerator = ContentGenerator<Arc<dyn TextModel>>;

pub struct AppState {
    /// `None` when no API key was configured; generation requests then
    /// fail with `INVALID_API_KEY`
    pub generator: Option<SharedGenerator>,
    pub orchestrator: PublishOrchestrator,
    pub limiter: RateLimiter,
    pub blocked_agents: Vec<String>,
}

pub type SharedState = Arc<AppState>;

impl AppState {
    pub fn new(
        generator: Option<SharedGenerator>,
        orchestrator: PublishOrchestrator,
        server: &ServerConfig,
    ) -> Self {
        Self {
            generator,
            orchestrator,
            limiter: RateLimiter::new(server.rate_limit_max, server.rate_limit_window()),
            blocked_agents: server.blocked_agents.iter().map(|a| a.to_lowercase()).collect(),
        }
    }

    /// Production wiring: Gemini, headless Chrome behind an admission
    /// limit, and an in-memory store seeded with sample posts
    pub fn from_config(config: &AutoblogConfig) -> Self {
        let generator = match GeminiClient::from_config(&config.generator) {
            Ok(client) => {
                info!("Using Gemini model {}", client.model());
                let model: Arc<dyn TextModel> = Arc::new(client);
                Some(
                    ContentGenerator::new(model)
                        .with_placeholder(config.publish.link_placeholder.clone())
                        .with_link_reserve(config.generator.link_reserve),
                )
            }
            Err(e) => {
                warn!("Content generation disabled: {}", e);
                None
            }
        };

        let automaton = PublishingAutomaton::chrome(config.browser.clone());
        let publisher = AdmissionControl::from_config(automaton, &config.publish);
        let orchestrator = PublishOrchestrator::new(
            Arc::new(InMemoryBlogStore::with_demo_posts()),
            Arc::new(publisher),
            config.publish.clone(),
        );

        Self::new(generator, orchestrator, &config.server)
    }
}

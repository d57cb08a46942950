//! # autoblog-server
//!
//! HTTP API for autoblog: generate an article and promo post, store blogs,
//! and publish promo posts through the browser automaton.

pub mod error;
mod middleware;
pub mod rate_limit;
mod server;
mod state;

pub use error::ApiError;
pub use rate_limit::RateLimiter;
pub use server::{router, serve};
pub use state::{AppState, SharedGenerator, SharedState};

use autoblog_core::AutoblogConfig;
use std::sync::Arc;
use tracing::info;

/// Run the API server with production wiring
pub async fn run(config: AutoblogConfig) -> anyhow::Result<()> {
    let addr = config.server.bind_addr();
    info!("Starting autoblog server on {}", addr);

    let state = Arc::new(AppState::from_config(&config));

    println!("autoblog API running at http://{}", addr);
    println!("Press Ctrl+C to stop");

    server::serve(state, &addr).await
}

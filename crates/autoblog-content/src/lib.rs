//! # autoblog-content
//!
//! Article and promo post generation for autoblog.
//!
//! The generator talks to a hosted text model through the [`TextModel`]
//! trait. [`GeminiClient`] is the production implementation; tests plug in
//! their own.
//!
//! One [`ContentGenerator::generate`] call makes exactly two model calls:
//! one for the long-form article and one for the promotional blurb. The
//! blurb keeps a link placeholder and is clamped so it still fits the
//! site's post limit once the real link is substituted.

mod auth;
mod circuit_breaker;
mod client;
mod generator;
mod prompts;
mod types;

pub use auth::{looks_like_api_key, resolve_api_key};
pub use circuit_breaker::{CircuitBreaker, CircuitState};
pub use client::GeminiClient;
pub use generator::ContentGenerator;
pub use prompts::{article_prompt, blurb_prompt, extract_title};
pub use types::*;

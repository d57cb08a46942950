//! # autoblog-core
//!
//! Core types for the autoblog publishing service.
//!
//! autoblog turns a topic into a long-form article plus a short promotional
//! post, stores the article, and can drive a headless browser through a
//! social site's web UI to publish the promo post.
//!
//! ## Shared vocabulary
//!
//! - [`Credentials`] never print their secret, not even through `Debug`
//! - [`PublishRequest`] is created per publish attempt and never persisted
//! - [`PublishOutcome`] is the structured result of one automation run
//! - [`BlogRecord`] is an article as kept by the blog store

pub mod config;
mod error;
pub mod fail_open;
pub mod payload;
mod types;

pub use config::AutoblogConfig;
pub use error::{AutoblogError, Result};
pub use types::*;

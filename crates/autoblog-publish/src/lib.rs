//! # autoblog-publish
//!
//! Blog storage and the publish orchestrator.
//!
//! This crate provides:
//! - [`BlogStore`] and its in-memory implementation
//! - The [`Publisher`] seam, implemented by the browser automaton
//! - [`AdmissionControl`], a cap on concurrent browser runs
//! - [`PublishOrchestrator`], which saves an article and then posts its promo

mod orchestrator;
mod publisher;
mod store;

pub use orchestrator::{PublishOrchestrator, PublishReport};
pub use publisher::{AdmissionControl, Publisher};
pub use store::{BlogStore, InMemoryBlogStore};

//! Browser automation that logs in to a social site and publishes a post
//!
//! The flow is written against the [`PageDriver`] trait so it can run on a
//! real headless Chrome ([`ChromeLauncher`]) or on a scripted page in tests.
//!
//! # Example
//!
//! ```no_run
//! use autoblog_browser::PublishingAutomaton;
//! use autoblog_core::config::BrowserConfig;
//! use autoblog_core::{Credentials, PublishRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let automaton = PublishingAutomaton::chrome(BrowserConfig::default());
//!     let request = PublishRequest::new("New post! [LINK]", Credentials::new("me", "hunter2"))
//!         .with_link(Some("https://yourblog.com/blogs/1".to_string()));
//!
//!     let outcome = automaton.publish(&request).await?;
//!     println!("succeeded: {} ({:?})", outcome.succeeded, outcome.diagnostic);
//!     Ok(())
//! }
//! ```
//!
//! # Modules
//!
//! - [`driver`]: the page-control and launcher traits
//! - [`browser`]: Chrome DevTools Protocol implementation
//! - [`locator`]: ordered fallback element search
//! - [`wait`]: bounded polling and the first-of-N race
//! - [`session`]: scoped browser ownership with single release
//! - [`site`]: selectors and labels for the target site
//! - [`automaton`]: the login-and-post state machine

pub mod automaton;
pub mod browser;
pub mod driver;
pub mod locator;
mod scripts;
pub mod session;
pub mod site;
pub mod wait;

pub use automaton::{PublishingAutomaton, RunState};
pub use browser::{ChromeLauncher, ChromePage};
pub use driver::{BrowserLauncher, PageDriver};
pub use locator::{Candidate, FieldLocator};
pub use session::SessionHandle;
pub use site::SiteProfile;
pub use wait::{first_of, wait_for, Signal};

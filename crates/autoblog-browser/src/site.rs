//! Markup knowledge for the target site

use crate::locator::{Candidate, FieldLocator};

/// Everything the automaton needs to know about the site's markup
#[derive(Debug, Clone)]
pub struct SiteProfile {
    pub identifier: FieldLocator,
    /// Interposed "confirm your username/phone/email" step
    pub identifier_confirmation: FieldLocator,
    pub secret: FieldLocator,
    pub composer: FieldLocator,
    pub submit: FieldLocator,
    /// Scope searched by label scans
    pub clickable_scope: String,
    pub advance_labels: Vec<String>,
    pub login_labels: Vec<String>,
    pub submit_labels: Vec<String>,
    /// Background colours of an enabled submit control
    pub enabled_colours: Vec<String>,
    pub toast: String,
}

impl SiteProfile {
    /// The X (formerly Twitter) web client
    pub fn x() -> Self {
        let labels = |ls: &[&str]| ls.iter().map(|l| l.to_string()).collect::<Vec<_>>();
        Self {
            identifier: FieldLocator::css(
                "input field",
                &[
                    r#"input[name="text"]"#,
                    r#"input[autocomplete="username"]"#,
                    r#"input[data-testid="ocfEnterTextTextInput"]"#,
                    r#"input[type="text"]"#,
                ],
            ),
            identifier_confirmation: FieldLocator::css(
                "identifier confirmation field",
                &[
                    r#"input[data-testid="ocfEnterTextTextInput"]"#,
                    r#"input[placeholder*="username"]"#,
                    r#"input[placeholder*="phone"]"#,
                    r#"input[placeholder*="email"]"#,
                ],
            ),
            secret: FieldLocator::css("password field", &[r#"input[name="password"]"#]),
            composer: FieldLocator::css(
                "composer",
                &[
                    r#"[data-testid="tweetTextarea_0"]"#,
                    r#"[aria-label="Post text"]"#,
                    r#"div[role="textbox"]"#,
                ],
            ),
            submit: FieldLocator::new(
                "submit control",
                vec![
                    Candidate::css(r#"button[data-testid="tweetButton"]"#),
                    Candidate::css(r#"button[data-testid="tweetButtonInline"]"#),
                    Candidate::css(r#"[data-testid="tweetButton"]"#),
                ],
            ),
            clickable_scope: r#"div[role="button"], button"#.to_string(),
            advance_labels: labels(&["next"]),
            login_labels: labels(&["log in", "sign in"]),
            submit_labels: labels(&["post"]),
            enabled_colours: labels(&["29, 155, 240", "15, 20, 25"]),
            toast: r#"div[data-testid="toast"]"#.to_string(),
        }
    }
}

impl Default for SiteProfile {
    fn default() -> Self {
        Self::x()
    }
}

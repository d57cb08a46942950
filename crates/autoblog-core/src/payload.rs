//! Text helpers for the promo post and for user input

use regex::Regex;
use std::sync::OnceLock;

/// Token the model is asked to leave where the article link goes
pub const DEFAULT_LINK_PLACEHOLDER: &str = "[LINK]";

/// Hard character limit of a post on the target site
pub const MAX_POST_CHARS: usize = 280;

/// Input length cap applied by [`sanitize_input`]
pub const MAX_INPUT_CHARS: usize = 1000;

const ELLIPSIS: char = '…';

/// Replace the first occurrence of `placeholder` with `link`.
///
/// Without a link the text comes back untouched, placeholder included.
pub fn substitute_link(text: &str, placeholder: &str, link: Option<&str>) -> String {
    match link {
        Some(link) if !placeholder.is_empty() => text.replacen(placeholder, link, 1),
        _ => text.to_string(),
    }
}

/// Character count of `text` once the placeholder is swapped for a link of
/// `link_len` characters.
pub fn effective_len(text: &str, placeholder: &str, link_len: usize) -> usize {
    let chars = text.chars().count();
    if !placeholder.is_empty() && text.contains(placeholder) {
        chars - placeholder.chars().count() + link_len
    } else {
        chars
    }
}

/// Shorten a promo blurb so it fits in `limit` characters after link
/// substitution, for any link up to `link_reserve` characters.
///
/// The placeholder survives clamping and is moved to the end.
pub fn clamp_blurb(text: &str, placeholder: &str, link_reserve: usize, limit: usize) -> String {
    let has_placeholder = !placeholder.is_empty() && text.contains(placeholder);
    let link_budget = link_reserve.max(placeholder.chars().count());

    if effective_len(text, placeholder, link_budget) <= limit {
        return text.to_string();
    }

    let body = if has_placeholder {
        text.replacen(placeholder, "", 1)
    } else {
        text.to_string()
    };
    let body = body.split_whitespace().collect::<Vec<_>>().join(" ");

    // ellipsis, plus a space and the link when there is one
    let overhead = if has_placeholder { link_budget + 2 } else { 1 };
    let budget = limit.saturating_sub(overhead);

    let mut clamped: String = body.chars().take(budget).collect();
    clamped.truncate(clamped.trim_end().len());
    clamped.push(ELLIPSIS);
    if has_placeholder {
        clamped.push(' ');
        clamped.push_str(placeholder);
    }
    clamped
}

fn script_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("(?i)script").expect("static regex"))
}

/// Strip markup characters and the word "script", then cap the length.
pub fn sanitize_input(input: &str) -> String {
    let stripped: String = input.trim().chars().filter(|c| !matches!(c, '<' | '>')).collect();
    script_pattern()
        .replace_all(&stripped, "")
        .chars()
        .take(MAX_INPUT_CHARS)
        .collect()
}

//! Prompt construction and title extraction

use autoblog_core::payload::MAX_POST_CHARS;
use autoblog_core::{Length, Style};
use regex::Regex;
use std::sync::OnceLock;

/// Prompt for the long-form article
pub fn article_prompt(topic: &str, length: Length, style: Style) -> String {
    format!(
        r#"Write a comprehensive blog post about "{topic}".

Requirements:
- Length: {words} words
- Tone: {tone}
- Include a catchy title (start with # for markdown)
- Structure with clear headings and subheadings
- Include practical tips and actionable advice
- Add a compelling introduction and conclusion
- Optimize for SEO and engagement
- Include a call-to-action at the end
- Use proper markdown formatting

Format the output as a well-structured blog post with proper markdown formatting."#,
        topic = topic,
        words = length.word_range(),
        tone = style.tone(),
    )
}

/// Prompt for the promotional blurb
pub fn blurb_prompt(topic: &str, placeholder: &str) -> String {
    format!(
        r#"Create a short promotional post for a blog post about "{topic}".

Requirements:
- Maximum {limit} characters (very important!)
- Include relevant hashtags (2-3 maximum)
- Be engaging and likely to get clicks
- Include emojis strategically
- End with a call to action to read the blog
- Include {placeholder} where the link should go
- Make it shareable and likely to get engagement

Do not include the actual link - just write {placeholder} where the link would go."#,
        topic = topic,
        limit = MAX_POST_CHARS,
        placeholder = placeholder,
    )
}

/// First markdown heading, or a title built from the topic
pub fn extract_title(article: &str, topic: &str) -> String {
    static HEADING: OnceLock<Regex> = OnceLock::new();
    let heading = HEADING.get_or_init(|| Regex::new(r"(?m)^#+\s*(.+?)\s*$").expect("static regex"));

    heading
        .captures(article)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| format!("{}: A Comprehensive Guide", capitalize(topic)))
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_article_prompt_carries_length_and_tone() {
        let prompt = article_prompt("home coffee brewing", Length::Long, Style::Professional);
        assert!(prompt.contains("\"home coffee brewing\""));
        assert!(prompt.contains("1500-2500 words"));
        assert!(prompt.contains("professional and authoritative"));
    }

    #[test]
    fn test_blurb_prompt_mentions_placeholder_and_limit() {
        let prompt = blurb_prompt("tea", "[LINK]");
        assert!(prompt.contains("Include [LINK] where the link should go"));
        assert!(prompt.contains("280 characters"));
    }

    #[test]
    fn test_title_from_heading() {
        let article = "Intro line\n# Brew Better Coffee  \n\n## Grind\n";
        assert_eq!(extract_title(article, "coffee"), "Brew Better Coffee");
    }

    #[test]
    fn test_title_fallback() {
        assert_eq!(
            extract_title("no headings here", "home coffee"),
            "Home coffee: A Comprehensive Guide"
        );
    }
}

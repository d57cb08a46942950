//! Type definitions for content generation

use async_trait::async_trait;
use autoblog_core::{Length, Result, Style};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A hosted text model: one prompt in, one completion out
#[async_trait]
pub trait TextModel: Send + Sync {
    async fn complete(&self, prompt: &str) -> Result<String>;
}

#[async_trait]
impl<T: TextModel + ?Sized> TextModel for Arc<T> {
    async fn complete(&self, prompt: &str) -> Result<String> {
        (**self).complete(prompt).await
    }
}

/// Generated article plus promo blurb
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedContent {
    pub title: String,
    /// Markdown article body
    #[serde(rename = "content")]
    pub article: String,
    /// Promo post, still carrying the link placeholder
    #[serde(rename = "tweet")]
    pub blurb: String,
    pub metadata: ContentMetadata,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentMetadata {
    pub word_count: usize,
    /// Minutes, at 200 words per minute
    pub reading_time: usize,
    pub topic: String,
    pub length: Length,
    pub style: Style,
    pub generated_at: DateTime<Utc>,
}

impl ContentMetadata {
    pub fn for_article(article: &str, topic: &str, length: Length, style: Style) -> Self {
        let word_count = article.split_whitespace().count();
        Self {
            word_count,
            reading_time: word_count.div_ceil(200),
            topic: topic.to_string(),
            length,
            style,
            generated_at: Utc::now(),
        }
    }
}

/// Gemini `generateContent` request body
#[derive(Debug, Clone, Serialize)]
pub struct GeminiRequest {
    pub contents: Vec<GeminiContent>,
}

impl GeminiRequest {
    pub fn from_prompt(prompt: &str) -> Self {
        Self {
            contents: vec![GeminiContent {
                role: Some("user".to_string()),
                parts: vec![GeminiPart {
                    text: Some(prompt.to_string()),
                }],
            }],
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default)]
    pub parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

/// Gemini `generateContent` response body
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiResponse {
    #[serde(default)]
    pub candidates: Vec<GeminiCandidate>,
    pub prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeminiCandidate {
    pub content: Option<GeminiContent>,
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PromptFeedback {
    pub block_reason: Option<String>,
}

impl GeminiResponse {
    /// Concatenated text of the first candidate
    pub fn text(&self) -> Option<String> {
        let content = self.candidates.first()?.content.as_ref()?;
        let text: String = content
            .parts
            .iter()
            .filter_map(|p| p.text.as_deref())
            .collect();
        if text.trim().is_empty() {
            None
        } else {
            Some(text)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metadata_reading_time_rounds_up() {
        let article = "word ".repeat(201);
        let meta = ContentMetadata::for_article(&article, "coffee", Length::Short, Style::Casual);
        assert_eq!(meta.word_count, 201);
        assert_eq!(meta.reading_time, 2);
    }

    #[test]
    fn test_response_text_joins_parts() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"candidates":[{"content":{"role":"model","parts":[{"text":"Hello, "},{"text":"world"}]},"finishReason":"STOP"}]}"#,
        )
        .unwrap();
        assert_eq!(response.text().as_deref(), Some("Hello, world"));
    }

    #[test]
    fn test_blocked_response_has_no_text() {
        let response: GeminiResponse = serde_json::from_str(
            r#"{"promptFeedback":{"blockReason":"SAFETY"}}"#,
        )
        .unwrap();
        assert!(response.text().is_none());
        assert_eq!(
            response.prompt_feedback.and_then(|f| f.block_reason).as_deref(),
            Some("SAFETY")
        );
    }

    #[test]
    fn test_generated_content_wire_names() {
        let content = GeneratedContent {
            title: "T".to_string(),
            article: "# T".to_string(),
            blurb: "B [LINK]".to_string(),
            metadata: ContentMetadata::for_article("# T", "t", Length::Medium, Style::Casual),
        };
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["content"], "# T");
        assert_eq!(json["tweet"], "B [LINK]");
        assert_eq!(json["metadata"]["readingTime"], 1);
        assert_eq!(json["metadata"]["length"], "medium");
    }
}

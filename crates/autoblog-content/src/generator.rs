//! Article and blurb generation on top of a [`TextModel`]

use crate::prompts::{article_prompt, blurb_prompt, extract_title};
use crate::types::{ContentMetadata, GeneratedContent, TextModel};
use autoblog_core::payload::{self, DEFAULT_LINK_PLACEHOLDER, MAX_POST_CHARS};
use autoblog_core::{AutoblogError, Length, Result, Style};
use tracing::info;

const DEFAULT_LINK_RESERVE: usize = 48;

/// Produces `{title, article, blurb, metadata}` for a topic
#[derive(Debug, Clone)]
pub struct ContentGenerator<M> {
    model: M,
    placeholder: String,
    link_reserve: usize,
}

impl<M: TextModel> ContentGenerator<M> {
    pub fn new(model: M) -> Self {
        Self {
            model,
            placeholder: DEFAULT_LINK_PLACEHOLDER.to_string(),
            link_reserve: DEFAULT_LINK_RESERVE,
        }
    }

    /// Token the blurb uses where the article link will go
    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = placeholder.into();
        self
    }

    /// Longest link the blurb must leave room for
    pub fn with_link_reserve(mut self, link_reserve: usize) -> Self {
        self.link_reserve = link_reserve;
        self
    }

    pub fn placeholder(&self) -> &str {
        &self.placeholder
    }

    /// Generate an article and its promo blurb.
    ///
    /// The topic is sanitised first; nothing left after sanitising is a
    /// validation error and no model call is made.
    pub async fn generate(&self, topic: &str, length: Length, style: Style) -> Result<GeneratedContent> {
        let topic = payload::sanitize_input(topic);
        if topic.trim().is_empty() {
            return Err(AutoblogError::Validation("Invalid topic provided".to_string()));
        }

        info!("Generating {} {} article for topic: \"{}\"", length, style, topic);

        let article = self
            .model
            .complete(&article_prompt(&topic, length, style))
            .await?;

        let raw_blurb = self
            .model
            .complete(&blurb_prompt(&topic, &self.placeholder))
            .await?;

        let blurb = payload::clamp_blurb(
            raw_blurb.replace('"', "").trim(),
            &self.placeholder,
            self.link_reserve,
            MAX_POST_CHARS,
        );

        let title = extract_title(&article, &topic);
        let metadata = ContentMetadata::for_article(&article, &topic, length, style);

        info!(
            "Generated \"{}\" ({} words, blurb {} chars)",
            title,
            metadata.word_count,
            blurb.chars().count()
        );

        Ok(GeneratedContent {
            title,
            article,
            blurb,
            metadata,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Replays canned completions and records prompts
    struct ScriptedModel {
        replies: Mutex<Vec<Result<String>>>,
        prompts: Mutex<Vec<String>>,
    }

    impl ScriptedModel {
        fn new(replies: Vec<Result<String>>) -> Self {
            Self {
                replies: Mutex::new(replies.into_iter().rev().collect()),
                prompts: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> usize {
            self.prompts.lock().unwrap().len()
        }
    }

    #[async_trait]
    impl TextModel for ScriptedModel {
        async fn complete(&self, prompt: &str) -> Result<String> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.replies
                .lock()
                .unwrap()
                .pop()
                .unwrap_or_else(|| Err(AutoblogError::Generation("no reply".to_string())))
        }
    }

    #[tokio::test]
    async fn test_generate_calls_model_twice() {
        let model = ScriptedModel::new(vec![
            Ok("# Home Coffee Brewing 101\n\nGrind fresh.".to_string()),
            Ok("\"☕ Level up your morning brew! [LINK] #coffee\"".to_string()),
        ]);
        let generator = ContentGenerator::new(model);

        let content = generator
            .generate("home coffee brewing", Length::Short, Style::Casual)
            .await
            .unwrap();

        assert_eq!(generator.model.calls(), 2);
        assert_eq!(content.title, "Home Coffee Brewing 101");
        assert_eq!(content.blurb, "☕ Level up your morning brew! [LINK] #coffee");
        assert_eq!(content.metadata.length, Length::Short);

        let prompts = generator.model.prompts.lock().unwrap();
        assert!(prompts[0].contains("300-500 words"));
        assert!(prompts[1].contains("[LINK]"));
    }

    #[tokio::test]
    async fn test_overlong_blurb_is_clamped() {
        let model = ScriptedModel::new(vec![
            Ok("# T\nbody".to_string()),
            Ok(format!("{} [LINK] #long", "coffee ".repeat(60))),
        ]);
        let generator = ContentGenerator::new(model).with_link_reserve(30);

        let content = generator.generate("coffee", Length::Medium, Style::Friendly).await.unwrap();
        let link = "https://yourblog.com/blogs/123";
        let posted = payload::substitute_link(&content.blurb, "[LINK]", Some(link));
        assert!(posted.chars().count() <= MAX_POST_CHARS);
        assert!(posted.contains(link));
    }

    #[tokio::test]
    async fn test_empty_topic_skips_model() {
        let generator = ContentGenerator::new(ScriptedModel::new(vec![]));
        let err = generator.generate("  <> ", Length::Short, Style::Casual).await.unwrap_err();
        assert!(matches!(err, AutoblogError::Validation(_)));
        assert_eq!(generator.model.calls(), 0);
    }

    #[tokio::test]
    async fn test_quota_error_propagates() {
        let model = ScriptedModel::new(vec![Err(AutoblogError::QuotaExceeded("429".to_string()))]);
        let generator = ContentGenerator::new(model);
        let err = generator.generate("coffee", Length::Short, Style::Casual).await.unwrap_err();
        assert_eq!(err.code(), "QUOTA_EXCEEDED");
        assert_eq!(generator.model.calls(), 1);
    }
}

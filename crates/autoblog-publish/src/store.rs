//! Blog record storage
//!
//! Records live in process memory only and are lost on restart.

use async_trait::async_trait;
use autoblog_core::{AutoblogError, BlogDraft, BlogRecord, Result};
use chrono::{Duration, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Storage seam for blog records
#[async_trait]
pub trait BlogStore: Send + Sync {
    /// Persist a new record and return it with its assigned id
    async fn create(&self, draft: BlogDraft) -> Result<BlogRecord>;

    async fn get(&self, id: u64) -> Result<BlogRecord>;

    /// All records, newest first
    async fn list(&self) -> Result<Vec<BlogRecord>>;

    /// Replace title, content, tweet and published flag. Counters and the
    /// creation time are kept.
    async fn update(&self, id: u64, draft: BlogDraft) -> Result<BlogRecord>;

    /// Remove a record, returning what was removed
    async fn delete(&self, id: u64) -> Result<BlogRecord>;

    /// Bump the view counter and return the new count
    async fn record_view(&self, id: u64) -> Result<u64>;

    /// Bump the like counter and return the new count
    async fn like(&self, id: u64) -> Result<u64>;
}

fn validate(draft: &BlogDraft) -> Result<()> {
    if draft.title.trim().is_empty() {
        return Err(AutoblogError::Validation("Blog title is required".to_string()));
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Inner {
    /// Newest first
    records: Vec<BlogRecord>,
    next_id: u64,
}

/// Process-memory [`BlogStore`] with sequential ids
#[derive(Debug, Default)]
pub struct InMemoryBlogStore {
    inner: RwLock<Inner>,
}

impl InMemoryBlogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-filled with a few sample posts
    pub fn with_demo_posts() -> Self {
        let now = Utc::now();
        let demo = [
            ("Getting Started with Home Coffee Brewing", 1245, 89, 2),
            ("10 Productivity Tips for Remote Workers", 892, 67, 5),
            ("A Beginner's Guide to Houseplants", 567, 34, 7),
        ];

        let mut records: Vec<BlogRecord> = demo
            .iter()
            .enumerate()
            .map(|(i, (title, views, likes, days_ago))| BlogRecord {
                id: i as u64 + 1,
                title: title.to_string(),
                content: format!("# {}\n\nSample post.", title),
                tweet: None,
                views: *views,
                likes: *likes,
                published: true,
                created_at: now - Duration::days(*days_ago),
            })
            .collect();
        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));

        let next_id = records.len() as u64 + 1;
        Self {
            inner: RwLock::new(Inner { records, next_id }),
        }
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl BlogStore for InMemoryBlogStore {
    async fn create(&self, draft: BlogDraft) -> Result<BlogRecord> {
        validate(&draft)?;

        let mut inner = self.inner.write().await;
        inner.next_id = inner.next_id.max(1);
        let record = BlogRecord {
            id: inner.next_id,
            title: draft.title,
            content: draft.content,
            tweet: draft.tweet,
            views: 0,
            likes: 0,
            published: draft.published,
            created_at: Utc::now(),
        };
        inner.next_id += 1;
        inner.records.insert(0, record.clone());

        info!("Stored blog {} \"{}\"", record.id, record.title);
        Ok(record)
    }

    async fn get(&self, id: u64) -> Result<BlogRecord> {
        self.inner
            .read()
            .await
            .records
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(AutoblogError::BlogNotFound(id))
    }

    async fn list(&self) -> Result<Vec<BlogRecord>> {
        Ok(self.inner.read().await.records.clone())
    }

    async fn update(&self, id: u64, draft: BlogDraft) -> Result<BlogRecord> {
        validate(&draft)?;

        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AutoblogError::BlogNotFound(id))?;

        record.title = draft.title;
        record.content = draft.content;
        record.tweet = draft.tweet;
        record.published = draft.published;

        debug!("Updated blog {}", id);
        Ok(record.clone())
    }

    async fn delete(&self, id: u64) -> Result<BlogRecord> {
        let mut inner = self.inner.write().await;
        let index = inner
            .records
            .iter()
            .position(|r| r.id == id)
            .ok_or(AutoblogError::BlogNotFound(id))?;

        info!("Deleted blog {}", id);
        Ok(inner.records.remove(index))
    }

    async fn record_view(&self, id: u64) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AutoblogError::BlogNotFound(id))?;
        record.views += 1;
        Ok(record.views)
    }

    async fn like(&self, id: u64) -> Result<u64> {
        let mut inner = self.inner.write().await;
        let record = inner
            .records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AutoblogError::BlogNotFound(id))?;
        record.likes += 1;
        Ok(record.likes)
    }
}

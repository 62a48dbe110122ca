use crate::types::{Article, Category, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreStore;
pub use memory::MemoryStore;

/// A generated summary persisted under the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRecord {
    pub url: String,
    pub title: String,
    pub summary: String,
    pub category: String,
    pub source: String,
    pub published: String,
    pub image: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl SummaryRecord {
    pub fn from_article(article: &Article, summary: String, category: Category) -> Self {
        Self {
            url: article.link.clone(),
            title: article.title.clone(),
            summary,
            category: category.label().to_string(),
            source: article.source.clone(),
            published: article.published.clone(),
            image: article.image.clone(),
            created_at: Utc::now(),
        }
    }
}

/// A saved article persisted under the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub url: String,
    pub title: String,
    pub source: String,
    pub published: String,
    pub image: Option<String>,
    pub summary: Option<String>,
    pub saved_at: DateTime<Utc>,
}

impl BookmarkRecord {
    pub fn from_article(article: &Article) -> Self {
        Self {
            url: article.link.clone(),
            title: article.title.clone(),
            source: article.source.clone(),
            published: article.published.clone(),
            image: article.image.clone(),
            summary: article.summary.clone(),
            saved_at: Utc::now(),
        }
    }
}

/// Key-value/document persistence, namespaced per user. Collections are
/// `summaries` and `bookmarks`; documents are keyed by the stable hash of the
/// article link. Writes are unconditional last-write-wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Stored summary text for an article, if the user has one.
    async fn get_summary(&self, user_id: &str, article_url: &str) -> Result<Option<String>>;

    async fn save_summary(&self, user_id: &str, record: &SummaryRecord) -> Result<()>;

    /// The user's own summaries for a category, newest first.
    async fn summaries_for_category(
        &self,
        user_id: &str,
        category: Category,
        limit: usize,
    ) -> Result<Vec<SummaryRecord>>;

    async fn save_bookmark(&self, user_id: &str, record: &BookmarkRecord) -> Result<()>;

    async fn remove_bookmark(&self, user_id: &str, article_url: &str) -> Result<()>;

    async fn is_bookmarked(&self, user_id: &str, article_url: &str) -> Result<bool>;

    /// All bookmarks for the user, most recently saved first.
    async fn bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkRecord>>;
}

use crate::store::{BookmarkRecord, DocumentStore, SummaryRecord};
use crate::types::{article_key, Category, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

#[derive(Default)]
struct UserDocs {
    summaries: HashMap<String, SummaryRecord>,
    bookmarks: HashMap<String, BookmarkRecord>,
}

/// In-process document store. Used when no Firestore project is configured
/// (anonymous/offline sessions) and throughout the test suite.
#[derive(Default)]
pub struct MemoryStore {
    users: RwLock<HashMap<String, UserDocs>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get_summary(&self, user_id: &str, article_url: &str) -> Result<Option<String>> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .and_then(|docs| docs.summaries.get(&article_key(article_url)))
            .map(|record| record.summary.clone()))
    }

    async fn save_summary(&self, user_id: &str, record: &SummaryRecord) -> Result<()> {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .summaries
            .insert(article_key(&record.url), record.clone());
        Ok(())
    }

    async fn summaries_for_category(
        &self,
        user_id: &str,
        category: Category,
        limit: usize,
    ) -> Result<Vec<SummaryRecord>> {
        let users = self.users.read().await;
        let mut records: Vec<SummaryRecord> = users
            .get(user_id)
            .map(|docs| {
                docs.summaries
                    .values()
                    .filter(|r| r.category == category.label())
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        records.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        records.truncate(limit);
        Ok(records)
    }

    async fn save_bookmark(&self, user_id: &str, record: &BookmarkRecord) -> Result<()> {
        let mut users = self.users.write().await;
        users
            .entry(user_id.to_string())
            .or_default()
            .bookmarks
            .insert(article_key(&record.url), record.clone());
        Ok(())
    }

    async fn remove_bookmark(&self, user_id: &str, article_url: &str) -> Result<()> {
        let mut users = self.users.write().await;
        if let Some(docs) = users.get_mut(user_id) {
            docs.bookmarks.remove(&article_key(article_url));
        }
        Ok(())
    }

    async fn is_bookmarked(&self, user_id: &str, article_url: &str) -> Result<bool> {
        let users = self.users.read().await;
        Ok(users
            .get(user_id)
            .map(|docs| docs.bookmarks.contains_key(&article_key(article_url)))
            .unwrap_or(false))
    }

    async fn bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkRecord>> {
        let users = self.users.read().await;
        let mut records: Vec<BookmarkRecord> = users
            .get(user_id)
            .map(|docs| docs.bookmarks.values().cloned().collect())
            .unwrap_or_default();

        records.sort_by(|a, b| b.saved_at.cmp(&a.saved_at));
        Ok(records)
    }
}

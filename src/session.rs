use crate::cache::{FeedCache, Page};
use crate::interaction::InteractionEngine;
use crate::store::{BookmarkRecord, DocumentStore};
use crate::types::{Category, Result};
use std::sync::Arc;
use tracing::info;

/// The two top-level views a reader can be in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Latest,
    Saved,
}

/// One interactive reading session for one signed-in user: the cached feeds,
/// the per-article interaction state, and the current viewing context.
///
/// Changing the context (category or view) bulk-resets the interaction flags;
/// staying in the same context leaves them alone.
pub struct Session {
    pub feed: FeedCache,
    pub interactions: InteractionEngine,
    store: Arc<dyn DocumentStore>,
    user_id: String,
    view: View,
    category: Category,
}

impl Session {
    pub fn new(
        feed: FeedCache,
        interactions: InteractionEngine,
        store: Arc<dyn DocumentStore>,
        user_id: String,
    ) -> Self {
        Self {
            feed,
            interactions,
            store,
            user_id,
            view: View::Latest,
            category: Category::Technology,
        }
    }

    pub fn view(&self) -> View {
        self.view
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Switch category; a real change clears all per-article flags.
    pub fn select_category(&mut self, category: Category) {
        if category != self.category {
            info!("Category change: {} -> {}", self.category, category);
            self.interactions.reset();
            self.category = category;
        }
    }

    /// Switch between Latest and Saved; a real change clears all flags.
    pub fn switch_view(&mut self, view: View) {
        if view != self.view {
            self.interactions.reset();
            self.view = view;
        }
    }

    /// Current page of the current category.
    pub async fn current_page(&mut self) -> Result<Page> {
        self.feed.get_page(self.category).await
    }

    pub async fn refresh(&mut self) -> Result<Page> {
        self.feed.force_refresh(self.category).await
    }

    pub fn next_page(&mut self) {
        self.interactions.reset();
        self.feed.advance(self.category);
    }

    pub fn previous_page(&mut self) {
        self.interactions.reset();
        self.feed.retreat(self.category);
    }

    /// The user's bookmarks, newest first (the Saved view).
    pub async fn saved_articles(&self) -> Result<Vec<BookmarkRecord>> {
        self.store.bookmarks(&self.user_id).await
    }

    pub async fn remove_bookmark(&self, article_url: &str) -> Result<()> {
        self.store.remove_bookmark(&self.user_id, article_url).await
    }

    pub async fn is_bookmarked(&self, article_url: &str) -> Result<bool> {
        self.store.is_bookmarked(&self.user_id, article_url).await
    }
}

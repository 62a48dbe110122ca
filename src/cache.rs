use crate::aggregator::NewsAggregator;
use crate::store::DocumentStore;
use crate::types::{Article, Category, Result};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub const PAGE_SIZE: usize = 10;

/// One page of the merged feed, with cursor bookkeeping for the caller.
#[derive(Debug, Clone)]
pub struct Page {
    pub articles: Vec<Article>,
    pub page_index: usize,
    pub page_count: usize,
}

struct CategoryFeed {
    articles: Vec<Article>,
    page: usize,
}

impl CategoryFeed {
    fn page_count(&self) -> usize {
        self.articles.len().div_ceil(PAGE_SIZE)
    }

    /// Keeps the cursor inside `[0, page_count - 1]` whenever the entry is
    /// read; the article count may have changed out from under it.
    fn clamp_page(&mut self) {
        let count = self.page_count();
        if count == 0 {
            self.page = 0;
        } else if self.page >= count {
            self.page = count - 1;
        }
    }

    fn current_page(&self) -> Page {
        let count = self.page_count();
        let start = self.page * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.articles.len());
        let articles = if start < self.articles.len() {
            self.articles[start..end].to_vec()
        } else {
            Vec::new()
        };

        Page {
            articles,
            page_index: self.page,
            page_count: count,
        }
    }
}

/// Session-local cache of merged feeds, one entry per category, with a
/// fixed-size page cursor over each.
pub struct FeedCache {
    aggregator: NewsAggregator,
    store: Arc<dyn DocumentStore>,
    user_id: String,
    entries: HashMap<Category, CategoryFeed>,
}

impl FeedCache {
    pub fn new(aggregator: NewsAggregator, store: Arc<dyn DocumentStore>, user_id: String) -> Self {
        Self {
            aggregator,
            store,
            user_id,
            entries: HashMap::new(),
        }
    }

    /// Current page for the category, fetching and caching the merged feed on
    /// first access. A cache hit returns the stored sequence unmodified.
    pub async fn get_page(&mut self, category: Category) -> Result<Page> {
        if !self.entries.contains_key(&category) {
            let articles = self.fetch_and_enrich(category).await?;
            self.entries.insert(category, CategoryFeed { articles, page: 0 });
        }

        let feed = self
            .entries
            .get_mut(&category)
            .expect("entry inserted above");
        feed.clamp_page();
        Ok(feed.current_page())
    }

    /// Bypasses the cache: re-aggregates, replaces the entry wholesale, and
    /// resets the cursor to the first page.
    pub async fn force_refresh(&mut self, category: Category) -> Result<Page> {
        info!("Force refresh for {}", category);
        let articles = self.fetch_and_enrich(category).await?;
        let feed = CategoryFeed { articles, page: 0 };
        let page = feed.current_page();
        self.entries.insert(category, feed);
        Ok(page)
    }

    /// Move to the next page; no-op on the last page (no wraparound).
    pub fn advance(&mut self, category: Category) {
        if let Some(feed) = self.entries.get_mut(&category) {
            feed.clamp_page();
            if feed.page_count() > 0 && feed.page < feed.page_count() - 1 {
                feed.page += 1;
            }
        }
    }

    /// Move to the previous page; no-op on page zero.
    pub fn retreat(&mut self, category: Category) {
        if let Some(feed) = self.entries.get_mut(&category) {
            feed.clamp_page();
            if feed.page > 0 {
                feed.page -= 1;
            }
        }
    }

    async fn fetch_and_enrich(&self, category: Category) -> Result<Vec<Article>> {
        let mut articles = self.aggregator.merge_and_sort(category).await?;

        // Read-through enrichment: back-fill summaries the user already has
        // stored, before the list is sliced into pages. Store trouble here
        // only costs the back-fill, never the feed.
        for article in &mut articles {
            match self.store.get_summary(&self.user_id, &article.link).await {
                Ok(Some(summary)) => {
                    debug!("Back-filled stored summary for {}", article.link);
                    article.summary = Some(summary);
                }
                Ok(None) => {}
                Err(e) => warn!("Summary lookup failed for {}: {}", article.link, e),
            }
        }

        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::NewsSource;
    use crate::store::{MemoryStore, SummaryRecord};
    use async_trait::async_trait;
    use chrono::Utc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingSource {
        articles: Vec<Article>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl NewsSource for CountingSource {
        fn name(&self) -> &str {
            "counting"
        }

        async fn fetch(&self, _category: Category, _max: usize) -> Result<Vec<Article>> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.articles.clone())
        }
    }

    fn articles(n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| Article {
                title: format!("story {i}"),
                link: format!("https://example.com/{i}"),
                published: format!("2024-01-{:02}T00:00:00Z", 28 - (i % 28)),
                summary: None,
                image: None,
                source: "test".to_string(),
            })
            .collect()
    }

    fn cache_with(n: usize, calls: Arc<AtomicUsize>) -> FeedCache {
        let aggregator = NewsAggregator::with_sources(vec![Box::new(CountingSource {
            articles: articles(n),
            calls,
        })]);
        FeedCache::new(aggregator, Arc::new(MemoryStore::new()), "u".to_string())
    }

    #[tokio::test]
    async fn empty_feed_yields_empty_page_without_error() {
        let mut cache = cache_with(0, Arc::new(AtomicUsize::new(0)));
        let page = cache.get_page(Category::Sports).await.unwrap();
        assert!(page.articles.is_empty());
        assert_eq!(page.page_count, 0);
        assert_eq!(page.page_index, 0);
    }

    #[tokio::test]
    async fn cache_hit_skips_the_aggregator() {
        let calls = Arc::new(AtomicUsize::new(0));
        let mut cache = cache_with(5, calls.clone());

        cache.get_page(Category::Technology).await.unwrap();
        cache.get_page(Category::Technology).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        cache.force_refresh(Category::Technology).await.unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn pagination_clamps_at_both_ends() {
        // 25 articles -> 3 pages of 10/10/5.
        let mut cache = cache_with(25, Arc::new(AtomicUsize::new(0)));
        let page = cache.get_page(Category::Technology).await.unwrap();
        assert_eq!(page.page_count, 3);
        assert_eq!(page.articles.len(), 10);

        cache.retreat(Category::Technology);
        assert_eq!(cache.get_page(Category::Technology).await.unwrap().page_index, 0);

        for _ in 0..10 {
            cache.advance(Category::Technology);
        }
        let last = cache.get_page(Category::Technology).await.unwrap();
        assert_eq!(last.page_index, 2);
        assert_eq!(last.articles.len(), 5);
    }

    #[tokio::test]
    async fn refresh_resets_cursor_even_when_feed_shrinks() {
        let calls = Arc::new(AtomicUsize::new(0));
        let aggregator = NewsAggregator::with_sources(vec![Box::new(ShrinkingSource {
            calls: calls.clone(),
        })]);
        let mut cache =
            FeedCache::new(aggregator, Arc::new(MemoryStore::new()), "u".to_string());

        // First fetch: 30 articles, walk to the last page.
        cache.get_page(Category::Business).await.unwrap();
        cache.advance(Category::Business);
        cache.advance(Category::Business);
        assert_eq!(cache.get_page(Category::Business).await.unwrap().page_index, 2);

        // Refresh shrinks the feed to 5 articles; cursor must be back at 0.
        let page = cache.force_refresh(Category::Business).await.unwrap();
        assert_eq!(page.page_index, 0);
        assert_eq!(page.page_count, 1);
        assert_eq!(page.articles.len(), 5);
    }

    struct ShrinkingSource {
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl NewsSource for ShrinkingSource {
        fn name(&self) -> &str {
            "shrinking"
        }

        async fn fetch(&self, _category: Category, _max: usize) -> Result<Vec<Article>> {
            let call = self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(articles(if call == 0 { 30 } else { 5 }))
        }
    }

    #[tokio::test]
    async fn stored_summaries_are_back_filled_before_slicing() {
        let store = Arc::new(MemoryStore::new());
        let all = articles(3);
        store
            .save_summary(
                "u",
                &SummaryRecord {
                    url: all[1].link.clone(),
                    title: all[1].title.clone(),
                    summary: "stored summary".to_string(),
                    category: "Technology".to_string(),
                    source: "test".to_string(),
                    published: all[1].published.clone(),
                    image: None,
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let aggregator = NewsAggregator::with_sources(vec![Box::new(CountingSource {
            articles: all.clone(),
            calls: Arc::new(AtomicUsize::new(0)),
        })]);
        let mut cache = FeedCache::new(aggregator, store, "u".to_string());

        let page = cache.get_page(Category::Technology).await.unwrap();
        let enriched = page
            .articles
            .iter()
            .find(|a| a.link == all[1].link)
            .unwrap();
        assert_eq!(enriched.summary.as_deref(), Some("stored summary"));
    }
}

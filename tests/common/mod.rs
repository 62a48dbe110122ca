#![allow(dead_code)]

use async_trait::async_trait;
use bytes::Bytes;
use chrono::{Duration, TimeZone, Utc};
use pulse_news::store::{BookmarkRecord, DocumentStore, MemoryStore, SummaryRecord};
use pulse_news::{Article, AudioLanguage, Category, NewsSource, Result, SpeechSynthesizer};

/// Adapter that serves a fixed article list, standing in for a provider.
pub struct StaticSource {
    pub name: &'static str,
    pub articles: Vec<Article>,
}

#[async_trait]
impl NewsSource for StaticSource {
    fn name(&self) -> &str {
        self.name
    }

    async fn fetch(&self, _category: Category, _max: usize) -> Result<Vec<Article>> {
        Ok(self.articles.clone())
    }
}

/// `count` articles with strictly decreasing publication times, so the merged
/// order is stable under the recency sort.
pub fn recent_articles(prefix: &str, count: usize, offset_minutes: i64) -> Vec<Article> {
    let base = Utc.with_ymd_and_hms(2024, 6, 15, 12, 0, 0).unwrap();
    (0..count)
        .map(|i| {
            let published = base - Duration::minutes(offset_minutes + i as i64);
            Article {
                title: format!("{prefix} story {i}"),
                link: format!("https://example.com/{prefix}/{i}"),
                published: published.to_rfc3339(),
                summary: Some(format!("{prefix} description {i}")),
                image: None,
                source: format!("test - {prefix}"),
            }
        })
        .collect()
}

/// Synthesizer that echoes its input, prefixed by the language code.
pub struct EchoSynthesizer;

#[async_trait]
impl SpeechSynthesizer for EchoSynthesizer {
    async fn synthesize(&self, text: &str, language: AudioLanguage) -> Result<Bytes> {
        Ok(Bytes::from(format!("{}:{}", language.code(), text)))
    }
}

/// Memory-backed store whose writes can be made to fail, for exercising the
/// partial-failure path of the save action.
pub struct FlakyStore {
    inner: MemoryStore,
    pub fail_summary_writes: bool,
    pub fail_bookmark_writes: bool,
}

impl FlakyStore {
    pub fn reliable() -> Self {
        Self {
            inner: MemoryStore::new(),
            fail_summary_writes: false,
            fail_bookmark_writes: false,
        }
    }

    pub fn failing_bookmarks() -> Self {
        Self {
            fail_bookmark_writes: true,
            ..Self::reliable()
        }
    }

    pub fn failing_summaries() -> Self {
        Self {
            fail_summary_writes: true,
            ..Self::reliable()
        }
    }
}

#[async_trait]
impl DocumentStore for FlakyStore {
    async fn get_summary(&self, user_id: &str, article_url: &str) -> Result<Option<String>> {
        self.inner.get_summary(user_id, article_url).await
    }

    async fn save_summary(&self, user_id: &str, record: &SummaryRecord) -> Result<()> {
        if self.fail_summary_writes {
            return Err(pulse_news::NewsError::Store("write refused".to_string()));
        }
        self.inner.save_summary(user_id, record).await
    }

    async fn summaries_for_category(
        &self,
        user_id: &str,
        category: Category,
        limit: usize,
    ) -> Result<Vec<SummaryRecord>> {
        self.inner.summaries_for_category(user_id, category, limit).await
    }

    async fn save_bookmark(&self, user_id: &str, record: &BookmarkRecord) -> Result<()> {
        if self.fail_bookmark_writes {
            return Err(pulse_news::NewsError::Store("write refused".to_string()));
        }
        self.inner.save_bookmark(user_id, record).await
    }

    async fn remove_bookmark(&self, user_id: &str, article_url: &str) -> Result<()> {
        self.inner.remove_bookmark(user_id, article_url).await
    }

    async fn is_bookmarked(&self, user_id: &str, article_url: &str) -> Result<bool> {
        self.inner.is_bookmarked(user_id, article_url).await
    }

    async fn bookmarks(&self, user_id: &str) -> Result<Vec<BookmarkRecord>> {
        self.inner.bookmarks(user_id).await
    }
}

use crate::types::{Article, Category, Result};
use async_trait::async_trait;

pub mod gnews;
pub mod newsapi;
pub mod rss;

pub use gnews::GnewsSource;
pub use newsapi::NewsApiSource;
pub use rss::RssSource;

/// A provider-specific fetcher that normalizes external article data into the
/// common [`Article`] shape.
///
/// Implementations own their category-name mapping and their own truncation
/// policy for the summary field. Network or credential problems degrade to an
/// empty result wherever possible; the aggregator treats a hard `Err` from one
/// source as a logged non-event and keeps going.
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Short label identifying this provider in logs.
    fn name(&self) -> &str;

    /// How many articles the aggregator should request from this source.
    fn default_limit(&self) -> usize {
        10
    }

    /// Fetch up to `max_results` articles for the given category.
    async fn fetch(&self, category: Category, max_results: usize) -> Result<Vec<Article>>;
}

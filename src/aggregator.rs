use crate::sources::{GnewsSource, NewsApiSource, NewsSource, RssSource};
use crate::types::{Article, Category, FetchConfig, Result};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Merges the configured provider adapters into one recency-ordered list.
pub struct NewsAggregator {
    sources: Vec<Box<dyn NewsSource>>,
}

impl NewsAggregator {
    /// Wires up the standard three-provider setup. Missing API keys simply
    /// disable the corresponding REST provider at fetch time.
    pub fn new(
        newsapi_key: Option<String>,
        gnews_key: Option<String>,
        config: &FetchConfig,
    ) -> Self {
        let sources: Vec<Box<dyn NewsSource>> = vec![
            Box::new(NewsApiSource::new(newsapi_key, config)),
            Box::new(GnewsSource::new(gnews_key, config)),
            Box::new(RssSource::new(config)),
        ];
        Self { sources }
    }

    pub fn with_sources(sources: Vec<Box<dyn NewsSource>>) -> Self {
        Self { sources }
    }

    /// Invokes every adapter in turn (one after another, never concurrently),
    /// concatenates whatever they produced, and applies a best-effort
    /// most-recent-first sort. A failing adapter contributes nothing but never
    /// aborts the pass. No count cap is applied here.
    pub async fn merge_and_sort(&self, category: Category) -> Result<Vec<Article>> {
        let mut merged = Vec::new();

        for source in &self.sources {
            match source.fetch(category, source.default_limit()).await {
                Ok(articles) => {
                    debug!(
                        "{} contributed {} articles for {}",
                        source.name(),
                        articles.len(),
                        category
                    );
                    merged.extend(articles);
                }
                Err(e) => {
                    warn!("{} failed for {}: {}", source.name(), category, e);
                }
            }
        }

        sort_recent_first(&mut merged);
        info!("Merged {} articles for {}", merged.len(), category);
        Ok(merged)
    }
}

/// Best-effort recency sort. Publication timestamps arrive in whatever format
/// each provider uses, so the sort only happens when every entry parses; a
/// single unparseable timestamp leaves the concatenation order untouched
/// rather than producing a partially reordered list.
fn sort_recent_first(articles: &mut [Article]) {
    let parsed: Option<Vec<DateTime<Utc>>> = articles
        .iter()
        .map(|a| parse_published(&a.published))
        .collect();

    match parsed {
        Some(keys) => {
            let mut order: Vec<usize> = (0..articles.len()).collect();
            order.sort_by(|&a, &b| keys[b].cmp(&keys[a]));

            let reordered: Vec<Article> = order.iter().map(|&i| articles[i].clone()).collect();
            articles.clone_from_slice(&reordered);
        }
        None => {
            debug!("Unparseable publication date, keeping concatenation order");
        }
    }
}

/// Accepts the formats the providers actually emit: RFC 3339 from the REST
/// APIs, RFC 2822 from feeds, and a bare ISO timestamp without offset.
pub fn parse_published(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    chrono::NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

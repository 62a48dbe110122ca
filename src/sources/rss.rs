use crate::sources::NewsSource;
use crate::types::{Article, Category, FetchConfig, Result};
use async_trait::async_trait;
use chrono::Utc;
use feed_rs::parser;
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, warn};

/// Longest provider description we keep; feeds routinely embed whole teasers.
const MAX_SUMMARY_CHARS: usize = 500;

/// RSS/Atom feed adapter. Each category maps to several redundant feed URLs;
/// results from all of them are merged before the requested cap is applied.
pub struct RssSource {
    client: Client,
}

impl RssSource {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    /// Feed URLs by category, with the General set as the fallback.
    fn feed_urls(category: Category) -> &'static [&'static str] {
        match category {
            Category::Technology => &[
                "https://feeds.bbci.co.uk/news/technology/rss.xml",
                "https://techcrunch.com/feed/",
                "https://www.wired.com/feed/rss",
            ],
            Category::Business => &[
                "https://feeds.bbci.co.uk/news/business/rss.xml",
                "https://www.cnbc.com/id/100003114/device/rss/rss.html",
            ],
            Category::Entertainment => &[
                "https://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml",
                "https://ew.com/feed/",
            ],
            Category::Health => &[
                "https://feeds.bbci.co.uk/news/health/rss.xml",
                "https://www.medicalnewstoday.com/rss",
            ],
            Category::Science => &[
                "https://feeds.bbci.co.uk/news/science_and_environment/rss.xml",
                "https://www.sciencedaily.com/rss/all.xml",
            ],
            Category::Sports => &[
                "https://feeds.bbci.co.uk/sport/rss.xml",
                "https://www.espn.com/espn/rss/news",
            ],
            _ => &[
                "https://feeds.bbci.co.uk/news/rss.xml",
                "https://rss.cnn.com/rss/edition.rss",
            ],
        }
    }

    async fn fetch_one_feed(&self, url: &str, max_results: usize) -> Result<Vec<Article>> {
        let body = self
            .client
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .bytes()
            .await?;

        let feed = parser::parse(body.as_ref())
            .map_err(|e| crate::types::NewsError::Feed(format!("{url}: {e}")))?;

        let feed_title = feed
            .title
            .map(|t| t.content)
            .unwrap_or_else(|| "RSS Feed".to_string());

        let articles = feed
            .entries
            .into_iter()
            .take(max_results)
            .filter_map(|entry| normalize_entry(entry, &feed_title))
            .collect();

        Ok(articles)
    }
}

#[async_trait]
impl NewsSource for RssSource {
    fn name(&self) -> &str {
        "RSS"
    }

    fn default_limit(&self) -> usize {
        20
    }

    async fn fetch(&self, category: Category, max_results: usize) -> Result<Vec<Article>> {
        let mut merged = Vec::new();

        for url in Self::feed_urls(category) {
            match self.fetch_one_feed(url, max_results).await {
                Ok(articles) => {
                    debug!("Feed {} contributed {} articles", url, articles.len());
                    merged.extend(articles);
                }
                Err(e) => {
                    warn!("Skipping feed {}: {}", url, e);
                }
            }
        }

        merged.truncate(max_results);
        Ok(merged)
    }
}

fn normalize_entry(entry: feed_rs::model::Entry, feed_title: &str) -> Option<Article> {
    let link = entry.links.first()?.href.clone();

    let title = entry
        .title
        .map(|t| t.content)
        .unwrap_or_else(|| "No Title".to_string());

    // Prefer the summary, fall back to the full content body.
    let raw_summary = entry
        .summary
        .map(|s| s.content)
        .or_else(|| entry.content.and_then(|c| c.body));

    let summary = raw_summary
        .map(|s| truncate_chars(strip_html(&s).trim(), MAX_SUMMARY_CHARS))
        .filter(|s| !s.is_empty());

    let published = entry
        .published
        .or(entry.updated)
        .map(|dt| dt.to_rfc2822())
        .unwrap_or_else(|| Utc::now().to_rfc3339());

    let image = entry
        .media
        .first()
        .and_then(|media| media.content.first())
        .and_then(|content| content.url.as_ref())
        .map(|url| url.to_string());

    Some(Article {
        title,
        link,
        published,
        summary,
        image,
        source: format!("RSS - {feed_title}"),
    })
}

/// Drops anything between `<` and `>`. Feed descriptions frequently carry
/// markup we never want to summarize or speak aloud.
fn strip_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut in_tag = false;
    for ch in raw.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            c if !in_tag => out.push(c),
            _ => {}
        }
    }
    out
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_removes_tags_and_keeps_text() {
        assert_eq!(strip_html("<p>Hello <b>world</b></p>"), "Hello world");
        assert_eq!(strip_html("plain text"), "plain text");
        assert_eq!(strip_html("<img src='x'/>"), "");
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        let text = "日本語のテキスト";
        assert_eq!(truncate_chars(text, 3), "日本語");
        assert_eq!(truncate_chars("short", 500), "short");
    }

    #[test]
    fn unknown_category_falls_back_to_general_feeds() {
        let general = RssSource::feed_urls(Category::General);
        assert_eq!(RssSource::feed_urls(Category::World), general);
        assert!(general[0].contains("bbci.co.uk"));
    }

    #[test]
    fn normalize_entry_cleans_summary() {
        let xml = r#"<?xml version="1.0"?>
            <rss version="2.0"><channel><title>Test Feed</title>
            <item>
              <title>Story</title>
              <link>https://example.com/story</link>
              <description>&lt;p&gt;A &lt;b&gt;bold&lt;/b&gt; claim&lt;/p&gt;</description>
              <pubDate>Sat, 21 Dec 2024 10:00:00 GMT</pubDate>
            </item>
            </channel></rss>"#;

        let feed = parser::parse(xml.as_bytes()).unwrap();
        let entry = feed.entries.into_iter().next().unwrap();
        let article = normalize_entry(entry, "Test Feed").unwrap();

        assert_eq!(article.title, "Story");
        assert_eq!(article.summary.as_deref(), Some("A bold claim"));
        assert_eq!(article.source, "RSS - Test Feed");
        assert!(article.published.contains("2024"));
    }
}

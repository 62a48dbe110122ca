use crate::sources::NewsSource;
use crate::types::{Article, Category, FetchConfig, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const TOP_HEADLINES_URL: &str = "https://gnews.io/api/v4/top-headlines";

/// GNews.io top-headlines adapter.
pub struct GnewsSource {
    client: Client,
    api_key: Option<String>,
}

impl GnewsSource {
    pub fn new(api_key: Option<String>, config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    /// GNews' external vocabulary. Unlike NewsAPI it also understands `world`
    /// and `nation`.
    fn category_param(category: Category) -> &'static str {
        match category {
            Category::Technology => "technology",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            Category::World => "world",
            Category::Nation => "nation",
            Category::General => "general",
        }
    }
}

#[async_trait]
impl NewsSource for GnewsSource {
    fn name(&self) -> &str {
        "GNews"
    }

    async fn fetch(&self, category: Category, max_results: usize) -> Result<Vec<Article>> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("GNews API key not configured, skipping");
                return Ok(Vec::new());
            }
        };

        let response = self
            .client
            .get(TOP_HEADLINES_URL)
            .query(&[
                ("category", Self::category_param(category)),
                ("lang", "en"),
                ("country", "us"),
                ("apikey", api_key),
                ("max", &max_results.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let payload: GnewsResponse = response.json().await?;
        let articles: Vec<Article> = payload
            .articles
            .into_iter()
            .map(|raw| raw.normalize())
            .collect();

        debug!("GNews returned {} articles for {}", articles.len(), category);
        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
struct GnewsResponse {
    #[serde(default)]
    articles: Vec<GnewsArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GnewsArticle {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    description: Option<String>,
    image: Option<String>,
    source: Option<GnewsOutlet>,
}

#[derive(Debug, Deserialize)]
struct GnewsOutlet {
    name: Option<String>,
}

impl GnewsArticle {
    fn normalize(self) -> Article {
        let outlet = self
            .source
            .and_then(|s| s.name)
            .unwrap_or_else(|| "Unknown".to_string());

        Article {
            title: self.title.unwrap_or_else(|| "No Title".to_string()),
            link: self.url.unwrap_or_else(|| "#".to_string()),
            published: self.published_at.unwrap_or_else(|| Utc::now().to_rfc3339()),
            summary: self.description.filter(|d| !d.is_empty()),
            image: self.image,
            source: format!("GNews - {outlet}"),
        }
    }
}

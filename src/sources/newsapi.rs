use crate::sources::NewsSource;
use crate::types::{Article, Category, FetchConfig, Result};
use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};

const TOP_HEADLINES_URL: &str = "https://newsapi.org/v2/top-headlines";

/// NewsAPI.org top-headlines adapter.
pub struct NewsApiSource {
    client: Client,
    api_key: Option<String>,
}

impl NewsApiSource {
    pub fn new(api_key: Option<String>, config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    /// NewsAPI's external category vocabulary, with a `general` fallback for
    /// anything it does not know about.
    fn category_param(category: Category) -> &'static str {
        match category {
            Category::Technology => "technology",
            Category::Business => "business",
            Category::Entertainment => "entertainment",
            Category::Health => "health",
            Category::Science => "science",
            Category::Sports => "sports",
            _ => "general",
        }
    }
}

#[async_trait]
impl NewsSource for NewsApiSource {
    fn name(&self) -> &str {
        "NewsAPI"
    }

    async fn fetch(&self, category: Category, max_results: usize) -> Result<Vec<Article>> {
        let api_key = match &self.api_key {
            Some(key) => key,
            None => {
                warn!("NewsAPI key not configured, skipping");
                return Ok(Vec::new());
            }
        };

        let response = self
            .client
            .get(TOP_HEADLINES_URL)
            .query(&[
                ("category", Self::category_param(category)),
                ("country", "us"),
                ("apiKey", api_key),
                ("pageSize", &max_results.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;

        let payload: NewsApiResponse = response.json().await?;
        if payload.status != "ok" {
            warn!("NewsAPI returned status {:?}", payload.status);
            return Ok(Vec::new());
        }

        let articles: Vec<Article> = payload
            .articles
            .into_iter()
            .map(|raw| raw.normalize())
            .collect();

        debug!("NewsAPI returned {} articles for {}", articles.len(), category);
        Ok(articles)
    }
}

#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    #[serde(default)]
    status: String,
    #[serde(default)]
    articles: Vec<NewsApiArticle>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NewsApiArticle {
    title: Option<String>,
    url: Option<String>,
    published_at: Option<String>,
    description: Option<String>,
    url_to_image: Option<String>,
    source: Option<NewsApiOutlet>,
}

#[derive(Debug, Deserialize)]
struct NewsApiOutlet {
    name: Option<String>,
}

impl NewsApiArticle {
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
            image: self.url_to_image,
            source: format!("NewsAPI - {outlet}"),
        }
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// One normalized news item, regardless of which provider produced it.
///
/// `link` is the natural identity; `published` keeps whatever format the
/// provider supplied (RFC 3339 from the REST APIs, RFC 2822 rendered from
/// feed dates). `summary` starts out as the provider description and is
/// replaced in place once an AI summary is attached.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Article {
    pub title: String,
    pub link: String,
    pub published: String,
    pub summary: Option<String>,
    pub image: Option<String>,
    pub source: String,
}

impl Article {
    /// Stable key for storage documents and per-article UI state.
    pub fn key(&self) -> String {
        article_key(&self.link)
    }
}

/// Deterministic digest of an article link (UUIDv5 in the URL namespace).
pub fn article_key(link: &str) -> String {
    Uuid::new_v5(&Uuid::NAMESPACE_URL, link.as_bytes())
        .simple()
        .to_string()
}

/// The internal category vocabulary. The first seven are user-selectable;
/// `World` and `Nation` exist only because GNews exposes them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    Technology,
    Business,
    Entertainment,
    Health,
    Science,
    Sports,
    General,
    World,
    Nation,
}

impl Category {
    /// Categories a user may pick from.
    pub fn selectable() -> &'static [Category] {
        &[
            Category::Technology,
            Category::Business,
            Category::Entertainment,
            Category::Health,
            Category::Science,
            Category::Sports,
            Category::General,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Category::Technology => "Technology",
            Category::Business => "Business",
            Category::Entertainment => "Entertainment",
            Category::Health => "Health",
            Category::Science => "Science",
            Category::Sports => "Sports",
            Category::General => "General",
            Category::World => "World",
            Category::Nation => "Nation",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = NewsError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "technology" | "tech" => Ok(Category::Technology),
            "business" => Ok(Category::Business),
            "entertainment" => Ok(Category::Entertainment),
            "health" => Ok(Category::Health),
            "science" => Ok(Category::Science),
            "sports" | "sport" => Ok(Category::Sports),
            "general" => Ok(Category::General),
            "world" => Ok(Category::World),
            "nation" => Ok(Category::Nation),
            other => Err(NewsError::General(format!("unknown category: {other}"))),
        }
    }
}

/// Transport settings shared by every outbound HTTP client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "pulse-news/1.0".to_string(),
            timeout_seconds: 10,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NewsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Feed(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Missing credential: {0}")]
    MissingCredential(&'static str),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Document store error: {0}")]
    Store(String),

    #[error("Language model error: {0}")]
    Model(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, NewsError>;

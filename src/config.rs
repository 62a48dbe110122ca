use crate::types::FetchConfig;
use std::env;
use tracing::debug;

/// Runtime configuration, read from the environment (a `.env` file is
/// honored). Every credential is optional: a missing key disables the
/// corresponding provider or collaborator rather than failing startup.
#[derive(Debug, Clone, Default)]
pub struct AppConfig {
    pub newsapi_key: Option<String>,
    pub gnews_key: Option<String>,
    pub groq_key: Option<String>,
    pub firebase_api_key: Option<String>,
    pub firebase_project_id: Option<String>,
    pub fetch: FetchConfig,
}

impl AppConfig {
    pub fn from_env() -> Self {
        // Best effort; absence of a .env file is normal.
        let _ = dotenvy::dotenv();

        let config = Self {
            newsapi_key: non_empty_var("NEWS_API_ORG"),
            gnews_key: non_empty_var("GNEWS_IO"),
            groq_key: non_empty_var("GROQ_API_KEY"),
            firebase_api_key: non_empty_var("FIREBASE_WEB_API_KEY"),
            firebase_project_id: non_empty_var("FIREBASE_PROJECT_ID"),
            fetch: FetchConfig::default(),
        };

        debug!(
            "Config: newsapi={} gnews={} groq={} firebase={}",
            config.newsapi_key.is_some(),
            config.gnews_key.is_some(),
            config.groq_key.is_some(),
            config.firebase_api_key.is_some(),
        );
        config
    }
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

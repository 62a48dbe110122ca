use crate::types::{FetchConfig, NewsError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

const CHAT_COMPLETIONS_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
const MODEL: &str = "llama-3.3-70b-versatile";

/// Hosted language model used for summarization and translation.
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// A 2-3 sentence summary of a news article.
    async fn summarize(&self, text: &str) -> Result<String>;

    /// Hindi rendition of English text. Callers degrade to the input on error.
    async fn translate_to_hindi(&self, text: &str) -> Result<String>;
}

/// Groq chat-completions client (OpenAI-compatible wire format).
pub struct GroqClient {
    client: Client,
    api_key: Option<String>,
}

impl GroqClient {
    pub fn new(api_key: Option<String>, config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client, api_key }
    }

    async fn chat(&self, prompt: String) -> Result<String> {
        let api_key = self
            .api_key
            .as_ref()
            .ok_or(NewsError::MissingCredential("GROQ_API_KEY"))?;

        let request = ChatRequest {
            model: MODEL.to_string(),
            messages: vec![ChatMessage {
                role: "user".to_string(),
                content: prompt,
            }],
        };

        let response = self
            .client
            .post(CHAT_COMPLETIONS_URL)
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(NewsError::Model(format!("{status}: {body}")));
        }

        let completion: ChatResponse = response.json().await?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or_else(|| NewsError::Model("empty completion".to_string()))?;

        debug!("Chat completion returned {} chars", content.len());
        Ok(content)
    }
}

#[async_trait]
impl LanguageModel for GroqClient {
    async fn summarize(&self, text: &str) -> Result<String> {
        let prompt = format!(
            "Summarize the following news article in 2-3 concise sentences. \
             Focus on the main facts:\n\n{text}"
        );
        self.chat(prompt).await
    }

    async fn translate_to_hindi(&self, text: &str) -> Result<String> {
        let prompt = format!(
            "Translate the following English text to Hindi. \
             Only provide the Hindi translation, nothing else:\n\n{text}"
        );
        self.chat(prompt).await
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

/// Deterministic model for development and tests: summaries are a truncated
/// echo, translations a tagged echo. Either call can be switched to fail.
pub struct MockLanguageModel {
    fail_summaries: bool,
    fail_translations: bool,
}

impl MockLanguageModel {
    pub fn new() -> Self {
        Self {
            fail_summaries: false,
            fail_translations: false,
        }
    }

    pub fn failing_summaries(mut self) -> Self {
        self.fail_summaries = true;
        self
    }

    pub fn failing_translations(mut self) -> Self {
        self.fail_translations = true;
        self
    }
}

impl Default for MockLanguageModel {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LanguageModel for MockLanguageModel {
    async fn summarize(&self, text: &str) -> Result<String> {
        if self.fail_summaries {
            return Err(NewsError::Model("mock summarizer offline".to_string()));
        }
        let head: String = text.chars().take(80).collect();
        Ok(format!("Summary: {head}"))
    }

    async fn translate_to_hindi(&self, text: &str) -> Result<String> {
        if self.fail_translations {
            return Err(NewsError::Model("mock translator offline".to_string()));
        }
        Ok(format!("[hi] {text}"))
    }
}

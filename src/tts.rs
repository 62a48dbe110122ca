use crate::types::{FetchConfig, NewsError, Result};
use async_trait::async_trait;
use bytes::{Bytes, BytesMut};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

const TRANSLATE_TTS_URL: &str = "https://translate.google.com/translate_tts";

/// The endpoint rejects long queries, so text is synthesized in chunks and
/// the MP3 segments concatenated.
const MAX_CHUNK_CHARS: usize = 200;

/// Languages the reader can listen in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AudioLanguage {
    English,
    Hindi,
}

impl AudioLanguage {
    pub fn code(&self) -> &'static str {
        match self {
            AudioLanguage::English => "en",
            AudioLanguage::Hindi => "hi",
        }
    }
}

/// Hosted text-to-speech collaborator.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// MP3 audio for the given text. Empty text is a failure, not silence.
    async fn synthesize(&self, text: &str, language: AudioLanguage) -> Result<Bytes>;
}

/// Google Translate's TTS endpoint, the same backend the original reader used.
pub struct TranslateTts {
    client: Client,
}

impl TranslateTts {
    pub fn new(config: &FetchConfig) -> Self {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .expect("Failed to create HTTP client");

        Self { client }
    }

    async fn fetch_chunk(&self, chunk: &str, language: AudioLanguage) -> Result<Bytes> {
        let response = self
            .client
            .get(TRANSLATE_TTS_URL)
            .query(&[
                ("ie", "UTF-8"),
                ("client", "tw-ob"),
                ("tl", language.code()),
                ("q", chunk),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(NewsError::Speech(format!(
                "TTS request failed: {}",
                response.status()
            )));
        }

        Ok(response.bytes().await?)
    }
}

#[async_trait]
impl SpeechSynthesizer for TranslateTts {
    async fn synthesize(&self, text: &str, language: AudioLanguage) -> Result<Bytes> {
        let text = text.trim();
        if text.is_empty() {
            return Err(NewsError::Speech("nothing to synthesize".to_string()));
        }

        let chunks = chunk_text(text, MAX_CHUNK_CHARS);
        debug!(
            "Synthesizing {} chars of {} audio in {} chunks",
            text.len(),
            language.code(),
            chunks.len()
        );

        let mut audio = BytesMut::new();
        for chunk in &chunks {
            audio.extend_from_slice(&self.fetch_chunk(chunk, language).await?);
        }

        Ok(audio.freeze())
    }
}

/// Splits on whitespace so no word straddles two audio segments; a single
/// overlong word becomes its own chunk.
fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for word in text.split_whitespace() {
        let needed = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if needed > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunking_respects_word_boundaries() {
        let text = "alpha beta gamma delta epsilon";
        let chunks = chunk_text(text, 11);
        assert_eq!(chunks, vec!["alpha beta", "gamma delta", "epsilon"]);
        assert!(chunks.iter().all(|c| c.chars().count() <= 11));
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello world", 200), vec!["hello world"]);
        assert!(chunk_text("   ", 200).is_empty());
    }

    #[test]
    fn language_codes_match_the_endpoint() {
        assert_eq!(AudioLanguage::English.code(), "en");
        assert_eq!(AudioLanguage::Hindi.code(), "hi");
    }
}

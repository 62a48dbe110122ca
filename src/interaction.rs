use crate::llm::LanguageModel;
use crate::store::{BookmarkRecord, DocumentStore, SummaryRecord};
use crate::tts::{AudioLanguage, SpeechSynthesizer};
use crate::types::{Article, Category, NewsError, Result};
use bytes::Bytes;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, error, warn};

/// Which audio rendition the user asked for. English and Hindi are mutually
/// exclusive per article.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AudioSelection {
    #[default]
    None,
    English,
    Hindi,
}

/// Ephemeral per-article UI state, keyed by the article's stable hash.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ArticleFlags {
    pub summary_visible: bool,
    pub summarizing: bool,
    pub audio: AudioSelection,
}

/// Drives per-article transitions (summarize, listen, save) against the
/// external collaborators, scoped to one signed-in user.
///
/// Summarization is two-phase so the in-progress state is observable:
/// [`begin_summarize`](Self::begin_summarize) flips the flag the UI disables
/// its control on, [`complete_summarize`](Self::complete_summarize) does the
/// work and always clears it again.
pub struct InteractionEngine {
    store: Arc<dyn DocumentStore>,
    model: Arc<dyn LanguageModel>,
    synthesizer: Arc<dyn SpeechSynthesizer>,
    user_id: String,
    flags: HashMap<String, ArticleFlags>,
}

impl InteractionEngine {
    pub fn new(
        store: Arc<dyn DocumentStore>,
        model: Arc<dyn LanguageModel>,
        synthesizer: Arc<dyn SpeechSynthesizer>,
        user_id: String,
    ) -> Self {
        Self {
            store,
            model,
            synthesizer,
            user_id,
            flags: HashMap::new(),
        }
    }

    /// Current flags for an article (default state if never touched).
    pub fn flags(&self, key: &str) -> ArticleFlags {
        self.flags.get(key).copied().unwrap_or_default()
    }

    /// Idle -> Summarizing. Returns whether the transition happened; a second
    /// trigger while in progress, or after the summary is visible, is a no-op.
    pub fn begin_summarize(&mut self, key: &str) -> bool {
        let flags = self.flags.entry(key.to_string()).or_default();
        if flags.summarizing || flags.summary_visible {
            return false;
        }
        flags.summarizing = true;
        true
    }

    /// Summarizing -> Summarized. A summary the user already has stored is
    /// reused verbatim without calling the model; otherwise the model runs and
    /// its output (or, on failure, the error text itself) becomes the summary
    /// and is persisted. The in-progress flag clears no matter what.
    pub async fn complete_summarize(&mut self, article: &mut Article, category: Category) {
        let summary = match self.store.get_summary(&self.user_id, &article.link).await {
            Ok(Some(existing)) => {
                debug!("Reusing stored summary for {}", article.link);
                existing
            }
            lookup => {
                if let Err(e) = lookup {
                    warn!("Summary lookup failed for {}: {}", article.link, e);
                }
                let summary = self.generate_summary(article).await;
                let record = SummaryRecord::from_article(article, summary.clone(), category);
                if let Err(e) = self.store.save_summary(&self.user_id, &record).await {
                    warn!("Could not persist summary for {}: {}", article.link, e);
                }
                summary
            }
        };

        article.summary = Some(summary);
        let flags = self.flags.entry(article.key()).or_default();
        flags.summarizing = false;
        flags.summary_visible = true;
    }

    /// Selects English audio (clearing any Hindi selection) and synthesizes
    /// the current summary. Synthesis trouble yields no audio, not an error.
    pub async fn play_english(&mut self, article: &Article) -> Option<Bytes> {
        self.flags.entry(article.key()).or_default().audio = AudioSelection::English;

        let text = article.summary.clone()?;
        match self.synthesizer.synthesize(&text, AudioLanguage::English).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!("English synthesis failed for {}: {}", article.link, e);
                None
            }
        }
    }

    /// Selects Hindi audio (clearing any English selection), translates the
    /// summary and synthesizes the result. Translation failure degrades to
    /// the untranslated text.
    pub async fn play_hindi(&mut self, article: &Article) -> Option<Bytes> {
        self.flags.entry(article.key()).or_default().audio = AudioSelection::Hindi;

        let english = article.summary.clone()?;
        let text = match self.model.translate_to_hindi(&english).await {
            Ok(hindi) => hindi,
            Err(e) => {
                warn!("Translation failed for {}, using English text: {}", article.link, e);
                english
            }
        };

        match self.synthesizer.synthesize(&text, AudioLanguage::Hindi).await {
            Ok(audio) => Some(audio),
            Err(e) => {
                warn!("Hindi synthesis failed for {}: {}", article.link, e);
                None
            }
        }
    }

    /// One-shot save: reuses or computes a summary, then persists both the
    /// summary and the bookmark. If either write fails the whole action fails
    /// with one generic error and nothing local changes.
    pub async fn save(&mut self, article: &mut Article, category: Category) -> Result<()> {
        let summary = match self.store.get_summary(&self.user_id, &article.link).await {
            Ok(Some(existing)) => existing,
            lookup => {
                if let Err(e) = lookup {
                    warn!("Summary lookup failed for {}: {}", article.link, e);
                }
                self.generate_summary(article).await
            }
        };

        let summary_record = SummaryRecord::from_article(article, summary.clone(), category);
        let mut bookmarked = article.clone();
        bookmarked.summary = Some(summary.clone());
        let bookmark_record = BookmarkRecord::from_article(&bookmarked);

        let summary_write = self.store.save_summary(&self.user_id, &summary_record).await;
        let bookmark_write = self.store.save_bookmark(&self.user_id, &bookmark_record).await;

        if let Some(e) = summary_write.as_ref().err().or(bookmark_write.as_ref().err()) {
            error!("Save failed for {}: {}", article.link, e);
            return Err(NewsError::Store("Failed to save article".to_string()));
        }

        article.summary = Some(summary);
        self.flags.entry(article.key()).or_default().summary_visible = true;
        Ok(())
    }

    /// Bulk reset: drops every per-article flag. Called when the viewing
    /// context (category or Latest/Saved view) changes.
    pub fn reset(&mut self) {
        self.flags.clear();
    }

    async fn generate_summary(&self, article: &Article) -> String {
        let text = format!(
            "{}. {}",
            article.title,
            article.summary.as_deref().unwrap_or_default()
        );
        match self.model.summarize(&text).await {
            Ok(summary) => summary,
            // The error text is what the user sees; there is no error state.
            Err(e) => format!("Error generating summary: {e}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLanguageModel;
    use crate::store::MemoryStore;
    use async_trait::async_trait;
    use chrono::Utc;

    struct StubSynthesizer {
        fail: bool,
    }

    #[async_trait]
    impl SpeechSynthesizer for StubSynthesizer {
        async fn synthesize(&self, text: &str, language: AudioLanguage) -> Result<Bytes> {
            if self.fail {
                return Err(NewsError::Speech("stub offline".to_string()));
            }
            Ok(Bytes::from(format!("{}:{}", language.code(), text)))
        }
    }

    fn engine(fail_tts: bool) -> InteractionEngine {
        InteractionEngine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockLanguageModel::new()),
            Arc::new(StubSynthesizer { fail: fail_tts }),
            "u".to_string(),
        )
    }

    fn article(link: &str) -> Article {
        Article {
            title: "Headline".to_string(),
            link: link.to_string(),
            published: "2024-06-15T12:00:00Z".to_string(),
            summary: Some("Provider description".to_string()),
            image: None,
            source: "test".to_string(),
        }
    }

    #[tokio::test]
    async fn summarize_lifecycle_sets_and_clears_flags() {
        let mut engine = engine(false);
        let mut a = article("https://example.com/a");
        let key = a.key();

        assert!(engine.begin_summarize(&key));
        assert!(engine.flags(&key).summarizing);
        // Duplicate trigger while in progress is ignored.
        assert!(!engine.begin_summarize(&key));

        engine.complete_summarize(&mut a, Category::Technology).await;
        let flags = engine.flags(&key);
        assert!(!flags.summarizing);
        assert!(flags.summary_visible);
        assert!(a.summary.as_deref().unwrap().starts_with("Summary: "));

        // Already summarized: no new transition.
        assert!(!engine.begin_summarize(&key));
    }

    #[tokio::test]
    async fn model_failure_becomes_the_summary_text() {
        let mut engine = InteractionEngine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockLanguageModel::new().failing_summaries()),
            Arc::new(StubSynthesizer { fail: false }),
            "u".to_string(),
        );
        let mut a = article("https://example.com/a");
        let key = a.key();

        engine.begin_summarize(&key);
        engine.complete_summarize(&mut a, Category::Science).await;

        let flags = engine.flags(&key);
        assert!(!flags.summarizing);
        assert!(flags.summary_visible);
        assert!(a.summary.as_deref().unwrap().starts_with("Error generating summary"));
    }

    #[tokio::test]
    async fn stored_summary_short_circuits_the_model() {
        let store = Arc::new(MemoryStore::new());
        let a0 = article("https://example.com/a");
        store
            .save_summary(
                "u",
                &SummaryRecord {
                    url: a0.link.clone(),
                    title: a0.title.clone(),
                    summary: "the stored one".to_string(),
                    category: "Technology".to_string(),
                    source: a0.source.clone(),
                    published: a0.published.clone(),
                    image: None,
                    created_at: Utc::now(),
                },
            )
            .await
            .unwrap();

        let mut engine = InteractionEngine::new(
            store,
            // A model that would fail loudly if it were consulted.
            Arc::new(MockLanguageModel::new().failing_summaries()),
            Arc::new(StubSynthesizer { fail: false }),
            "u".to_string(),
        );

        let mut a = article("https://example.com/a");
        engine.begin_summarize(&a.key());
        engine.complete_summarize(&mut a, Category::Technology).await;
        assert_eq!(a.summary.as_deref(), Some("the stored one"));
    }

    #[tokio::test]
    async fn audio_selections_are_mutually_exclusive() {
        let mut engine = engine(false);
        let a = article("https://example.com/a");
        let key = a.key();

        let audio = engine.play_english(&a).await.unwrap();
        assert!(audio.starts_with(b"en:"));
        assert_eq!(engine.flags(&key).audio, AudioSelection::English);

        let audio = engine.play_hindi(&a).await.unwrap();
        assert!(audio.starts_with(b"hi:[hi] "));
        assert_eq!(engine.flags(&key).audio, AudioSelection::Hindi);

        engine.play_english(&a).await;
        assert_eq!(engine.flags(&key).audio, AudioSelection::English);
    }

    #[tokio::test]
    async fn translation_failure_degrades_to_english_text() {
        let mut engine = InteractionEngine::new(
            Arc::new(MemoryStore::new()),
            Arc::new(MockLanguageModel::new().failing_translations()),
            Arc::new(StubSynthesizer { fail: false }),
            "u".to_string(),
        );
        let a = article("https://example.com/a");

        let audio = engine.play_hindi(&a).await.unwrap();
        // Hindi voice, untranslated text.
        assert_eq!(&audio[..], b"hi:Provider description");
        assert_eq!(engine.flags(&a.key()).audio, AudioSelection::Hindi);
    }

    #[tokio::test]
    async fn synthesis_failure_yields_no_audio_but_keeps_selection() {
        let mut engine = engine(true);
        let a = article("https://example.com/a");

        assert!(engine.play_english(&a).await.is_none());
        assert_eq!(engine.flags(&a.key()).audio, AudioSelection::English);
    }

    #[tokio::test]
    async fn reset_clears_every_flag() {
        let mut engine = engine(false);
        let a = article("https://example.com/a");
        let b = article("https://example.com/b");

        engine.begin_summarize(&a.key());
        engine.play_english(&b).await;
        engine.reset();

        assert_eq!(engine.flags(&a.key()), ArticleFlags::default());
        assert_eq!(engine.flags(&b.key()), ArticleFlags::default());
    }
}

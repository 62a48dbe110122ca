pub mod aggregator;
pub mod auth;
pub mod cache;
pub mod config;
pub mod interaction;
pub mod llm;
pub mod session;
pub mod sources;
pub mod store;
pub mod tts;
pub mod types;

pub use aggregator::NewsAggregator;
pub use auth::{AuthClient, UserSession};
pub use cache::{FeedCache, Page, PAGE_SIZE};
pub use config::AppConfig;
pub use interaction::{ArticleFlags, AudioSelection, InteractionEngine};
pub use llm::{GroqClient, LanguageModel, MockLanguageModel};
pub use session::{Session, View};
pub use sources::{GnewsSource, NewsApiSource, NewsSource, RssSource};
pub use store::{BookmarkRecord, DocumentStore, FirestoreStore, MemoryStore, SummaryRecord};
pub use tts::{AudioLanguage, SpeechSynthesizer, TranslateTts};
pub use types::{article_key, Article, Category, FetchConfig, NewsError, Result};

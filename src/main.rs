use anyhow::Result;
use clap::{Parser, Subcommand};
use pulse_news::{
    AppConfig, AuthClient, Category, DocumentStore, FeedCache, FirestoreStore, MemoryStore,
    NewsAggregator,
};
use std::sync::Arc;
use tracing::info;

#[derive(Parser)]
#[command(name = "pulse-news", about = "Personalized news reader")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the categories a reader can pick from
    Categories,
    /// Fetch the merged feed for a category and print one page
    Fetch {
        #[arg(long, default_value = "technology")]
        category: String,
        /// Zero-based page to show
        #[arg(long, default_value_t = 0)]
        page: usize,
        /// Sign in to enable stored-summary enrichment
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        password: Option<String>,
    },
    /// List saved articles (requires sign-in)
    Saved {
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt::init();
    let config = AppConfig::from_env();
    let cli = Cli::parse();

    match cli.command {
        Commands::Categories => {
            for category in Category::selectable() {
                println!("{category}");
            }
        }
        Commands::Fetch {
            category,
            page,
            email,
            password,
        } => {
            let category: Category = category.parse()?;
            let (store, user_id) =
                build_store(&config, email.as_deref(), password.as_deref()).await?;

            let aggregator = NewsAggregator::new(
                config.newsapi_key.clone(),
                config.gnews_key.clone(),
                &config.fetch,
            );
            let mut cache = FeedCache::new(aggregator, store, user_id);

            let mut current = cache.get_page(category).await?;
            for _ in 0..page.min(current.page_count.saturating_sub(1)) {
                cache.advance(category);
                current = cache.get_page(category).await?;
            }

            println!(
                "{} news - page {}/{} ({} shown)",
                category,
                current.page_index + 1,
                current.page_count.max(1),
                current.articles.len()
            );
            for article in &current.articles {
                println!("\n  {}", article.title);
                println!("    {} | {}", article.source, article.published);
                println!("    {}", article.link);
                if let Some(summary) = &article.summary {
                    println!("    {summary}");
                }
            }
        }
        Commands::Saved { email, password } => {
            let (store, user_id) = build_store(&config, Some(&email), Some(&password)).await?;
            let bookmarks = store.bookmarks(&user_id).await?;
            if bookmarks.is_empty() {
                println!("No saved articles yet.");
            }
            for bookmark in bookmarks {
                println!("\n  {}", bookmark.title);
                println!("    {} | saved {}", bookmark.source, bookmark.saved_at);
                println!("    {}", bookmark.url);
                if let Some(summary) = &bookmark.summary {
                    println!("    {summary}");
                }
            }
        }
    }

    Ok(())
}

/// Firestore-backed store when the user signs in and Firebase is configured,
/// otherwise an anonymous in-memory store.
async fn build_store(
    config: &AppConfig,
    email: Option<&str>,
    password: Option<&str>,
) -> Result<(Arc<dyn DocumentStore>, String)> {
    if let (Some(email), Some(password), Some(api_key), Some(project_id)) = (
        email,
        password,
        config.firebase_api_key.as_ref(),
        config.firebase_project_id.as_ref(),
    ) {
        let auth = AuthClient::new(api_key.clone(), &config.fetch);
        let session = auth.sign_in(email, password).await?;
        let store = FirestoreStore::new(project_id.clone(), session.id_token, &config.fetch);
        Ok((Arc::new(store), session.user_id))
    } else {
        info!("No credentials; using in-memory store");
        Ok((Arc::new(MemoryStore::new()), "local".to_string()))
    }
}

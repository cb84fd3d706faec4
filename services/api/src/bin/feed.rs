//! services/api/src/bin/feed.rs
//!
//! Terminal reader for a running DailyStream server. Pages through a headline
//! category or a search the same way the web client scrolls: the first page
//! comes from the local cache when it is fresh, and each time the last
//! printed article "comes into view" the next page is requested.

use api_lib::adapters::{FileStore, HttpNewsBackend, SystemClock};
use clap::{Parser, Subcommand};
use dailystream_core::domain::{Article, Feed};
use dailystream_core::feed::{Applied, FeedPager, FeedState};
use dailystream_core::fetcher::{PaginatedCacheFetcher, DEFAULT_PAGE_SIZE};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::{debug, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "feed")]
#[command(about = "Read DailyStream headlines and searches from the terminal")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Args {
    /// Root URL of the DailyStream server
    #[arg(long, default_value = "http://localhost:5000")]
    backend_url: String,

    /// File holding the first-page cache between runs
    #[arg(long, default_value = ".dailystream-cache.json")]
    cache_file: PathBuf,

    /// Maximum number of pages to load
    #[arg(long, default_value_t = 1)]
    pages: u32,

    #[arg(long, default_value_t = DEFAULT_PAGE_SIZE)]
    page_size: u32,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Top headlines for a category
    Headlines {
        #[arg(default_value = "general")]
        category: String,
    },
    /// Search articles; category names act as category filters
    Search { query: String },
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let feed = match &args.command {
        Command::Headlines { category } => Feed::headlines(category.as_str()),
        Command::Search { query } => match Feed::search(query) {
            Some(feed) => feed,
            None => {
                eprintln!("Enter a search term.");
                return ExitCode::FAILURE;
            }
        },
    };

    let backend = Arc::new(HttpNewsBackend::new(
        reqwest::Client::new(),
        args.backend_url.as_str(),
    ));
    // Best effort: the feed request below reports real failures.
    if let Err(e) = backend.wake().await {
        warn!("Wake-up ping failed: {}", e);
    }
    let store = Arc::new(FileStore::open(&args.cache_file));
    debug!(path = %store.path().display(), "Using cache file");
    let fetcher = Arc::new(PaginatedCacheFetcher::new(
        backend,
        store,
        Arc::new(SystemClock),
    ));
    let mut pager = FeedPager::new(fetcher, args.page_size);

    println!("== {} ==", feed);
    let mut printed = 0;
    pager.open(feed).await;
    printed += print_new(pager.controller().articles(), printed);

    let mut pages_loaded = 1;
    while pages_loaded < args.pages {
        // The last article was just printed, so it is "in view".
        match pager.on_last_item_visible(true).await {
            Some(Applied::Appended { .. }) => {
                pages_loaded += 1;
                printed += print_new(pager.controller().articles(), printed);
            }
            Some(Applied::Failed) => {
                eprintln!("Could not load more articles.");
                break;
            }
            Some(Applied::Stale) | None => break,
        }
    }

    match pager.controller().state() {
        FeedState::Error(message) => {
            eprintln!("{}", message);
            return ExitCode::FAILURE;
        }
        _ if printed == 0 => println!("No articles found."),
        FeedState::Exhausted | FeedState::Ready { has_more: false } => {
            println!("You've reached the end of the news feed.")
        }
        _ => {}
    }
    ExitCode::SUCCESS
}

fn print_new(articles: &[Article], already_printed: usize) -> usize {
    let fresh = &articles[already_printed.min(articles.len())..];
    for (offset, article) in fresh.iter().enumerate() {
        let number = already_printed + offset + 1;
        println!();
        println!("{:>3}. {}", number, article.title());
        println!(
            "     {} | {}",
            article.source_name(),
            article.published_at.as_deref().unwrap_or("unknown date")
        );
        if !article.description().is_empty() {
            println!("     {}", article.description());
        }
        if let Some(url) = article.url.as_deref() {
            println!("     Read more: {}", url);
        }
        println!("     Image: {}", article.image_url());
    }
    fresh.len()
}

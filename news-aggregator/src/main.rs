use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use news_aggregator::sources::bbc::ALLORIGINS_RELAY;
use news_aggregator::{
    ApiCredentials, Article, FetchConfig, FileStore, NewsAggregator, NewsFeed, SettingsStore,
};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "news-aggregator")]
#[command(about = "Calm, de-sensationalized news from several sources")]
struct Args {
    /// Directory holding the settings record
    #[arg(long)]
    settings_dir: Option<PathBuf>,

    /// Read BBC feeds through this CORS relay endpoint, e.g.
    /// https://api.allorigins.win/get ("default" selects it)
    #[arg(long)]
    bbc_proxy: Option<String>,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    timeout: u64,

    /// Print articles as JSON
    #[arg(long)]
    json: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand)]
enum Command {
    /// Articles for the enabled topics (default)
    Feed,
    /// Newest articles from every source
    All,
    /// Show which topics are enabled
    Topics,
    /// Enable a topic by label, e.g. "Technology"
    Enable { label: String },
    /// Disable a topic by label
    Disable { label: String },
    /// Restore the default topic selection
    Reset,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let store = match &args.settings_dir {
        Some(dir) => FileStore::new(dir),
        None => FileStore::default(),
    };
    info!("Using settings in {}", store.dir().display());
    let settings = SettingsStore::new(store);

    match args.command.unwrap_or(Command::Feed) {
        Command::Topics => print_topics(&settings),
        Command::Enable { label } => {
            if !settings.update_topic(&label, true) {
                println!("{} was already enabled or is not a known topic", label);
            }
            print_topics(&settings);
        }
        Command::Disable { label } => {
            if !settings.update_topic(&label, false) {
                println!("{} was not enabled or is not a known topic", label);
            }
            print_topics(&settings);
        }
        Command::Reset => {
            settings.reset();
            print_topics(&settings);
        }
        Command::Feed => {
            let aggregator = build_aggregator(args.bbc_proxy.as_deref(), args.timeout)?;
            let feed = aggregator.fetch_for_settings(&settings).await;
            print_feed(&feed, args.json)?;
        }
        Command::All => {
            let aggregator = build_aggregator(args.bbc_proxy.as_deref(), args.timeout)?;
            let articles = aggregator.fetch_all().await;
            print_feed(
                &NewsFeed {
                    articles,
                    advisory: None,
                },
                args.json,
            )?;
        }
    }

    Ok(())
}

fn build_aggregator(bbc_proxy: Option<&str>, timeout: u64) -> Result<NewsAggregator> {
    let fetch_config = FetchConfig {
        timeout_seconds: timeout,
        ..FetchConfig::default()
    };
    let relay = bbc_proxy.map(|proxy| match proxy {
        "default" => ALLORIGINS_RELAY.to_string(),
        other => other.to_string(),
    });

    NewsAggregator::with_default_sources(fetch_config, ApiCredentials::from_env(), relay)
        .context("Failed to set up news sources")
}

fn print_topics<S: news_aggregator::KeyValueStore>(settings: &SettingsStore<S>) {
    for topic in settings.topic_settings() {
        let mark = if topic.enabled { "x" } else { " " };
        println!("[{}] {}", mark, topic.label);
    }
}

fn print_feed(feed: &NewsFeed, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(feed)?);
        return Ok(());
    }

    if let Some(advisory) = feed.advisory {
        println!("{}", advisory.message());
        return Ok(());
    }

    for article in &feed.articles {
        print_article(article);
    }
    Ok(())
}

fn print_article(article: &Article) {
    println!(
        "{} [{}] {}",
        article.published_at.format("%Y-%m-%d %H:%M"),
        article.category.label(),
        article.headline
    );
    println!("    {}", article.summary);
    for source in &article.sources {
        println!("    {} <{}>", source.name, source.url);
    }
    println!();
}

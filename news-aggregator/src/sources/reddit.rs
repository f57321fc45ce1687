use crate::fetcher::Fetcher;
use crate::normalizer::{neutralize_headline, summarize};
use crate::sources::{canned, retain_topics};
use crate::traits::{NewsSource, SourceKind};
use crate::types::{AggregatorError, Article, ArticleSource, Result, Topic};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{debug, info};

pub const REDDIT_URL: &str = "https://www.reddit.com";
pub const SUBREDDITS: [&str; 4] = ["worldnews", "news", "Finland", "europe"];
/// Posts at or below this score are dropped.
pub const MIN_SCORE: i64 = 100;
const POSTS_PER_SUBREDDIT: &str = "5";
const MAX_POSTS: usize = 10;

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    #[serde(default)]
    children: Vec<Child>,
}

#[derive(Debug, Deserialize)]
struct Child {
    data: Post,
}

#[derive(Debug, Deserialize)]
struct Post {
    id: String,
    title: String,
    url: Option<String>,
    subreddit: String,
    created_utc: f64,
    #[serde(default)]
    selftext: String,
    #[serde(default)]
    score: i64,
}

/// Public subreddit listings, no credentials required
pub struct RedditSource {
    fetcher: Fetcher,
    base_url: String,
    subreddits: Vec<String>,
}

impl RedditSource {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            base_url: REDDIT_URL.to_string(),
            subreddits: SUBREDDITS.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Convert one `hot.json` listing, dropping low-score posts.
    pub fn parse_listing(body: &str) -> Result<Vec<Article>> {
        let listing: Listing = serde_json::from_str(body)?;
        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .filter(|post| post.score > MIN_SCORE)
            .map(convert_post)
            .collect())
    }

    async fn fetch_subreddit(&self, subreddit: &str) -> Result<Vec<Article>> {
        let url = format!("{}/r/{}/hot.json", self.base_url.trim_end_matches('/'), subreddit);
        let body = self
            .fetcher
            .get_text(&url, &[("limit", POSTS_PER_SUBREDDIT)])
            .await?;
        Self::parse_listing(&body)
    }
}

fn convert_post(post: Post) -> Article {
    let published_at = DateTime::<Utc>::from_timestamp(post.created_utc as i64, 0).unwrap_or_else(Utc::now);
    let source_name = format!("r/{}", post.subreddit);

    Article {
        id: format!("reddit-{}", post.id),
        headline: neutralize_headline(&post.title),
        summary: summarize(Some(&post.selftext), &post.title),
        category: Topic::classify(&post.subreddit),
        sources: vec![match post.url {
            Some(url) if !url.is_empty() => ArticleSource::new(source_name, url),
            _ => ArticleSource::placeholder(source_name),
        }],
        published_at,
    }
}

#[async_trait]
impl NewsSource for RedditSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Reddit
    }

    fn source_name(&self) -> String {
        "Reddit".to_string()
    }

    async fn pull(&self, topics: Option<&[String]>) -> Result<Vec<Article>> {
        let results = futures::future::join_all(
            self.subreddits.iter().map(|subreddit| self.fetch_subreddit(subreddit)),
        )
        .await;

        let mut articles = Vec::new();
        for (subreddit, result) in self.subreddits.iter().zip(results) {
            match result {
                Ok(posts) => articles.extend(posts),
                // A rejected listing only skips that subreddit
                Err(AggregatorError::Status { status, .. }) => {
                    debug!("Skipping r/{} after HTTP {}", subreddit, status);
                }
                Err(e) => return Err(e),
            }
        }

        articles.truncate(MAX_POSTS);
        retain_topics(&mut articles, topics);
        info!("Reddit listings produced {} articles", articles.len());
        Ok(articles)
    }

    fn fallback_articles(&self, topics: Option<&[String]>) -> Vec<Article> {
        let mut articles = vec![canned(
            "reddit-mock-1",
            "Global climate summit reaches agreement on emission targets",
            "International delegates established new framework for reducing carbon emissions over the next decade. The agreement includes specific commitments from major economies and developing nations.",
            Topic::World,
            "r/worldnews",
            5,
        )];
        retain_topics(&mut articles, topics);
        articles
    }

    fn resolve_url(&self, article: &Article) -> Option<String> {
        let subreddit = article
            .sources
            .first()
            .and_then(|source| source.name.strip_prefix("r/"))?;
        Some(format!("{}/r/{}", REDDIT_URL, subreddit))
    }
}

pub mod bbc;
pub mod guardian;
pub mod reddit;
pub mod yle;

pub use bbc::BbcSource;
pub use guardian::GuardianSource;
pub use reddit::RedditSource;
pub use yle::YleSource;

use crate::types::{Article, ArticleSource, Topic};
use chrono::{DateTime, Duration, Utc};

/// Parse an upstream RFC 3339 timestamp, treating anything unreadable as now.
pub(crate) fn parse_timestamp(value: Option<&str>) -> DateTime<Utc> {
    value
        .and_then(|v| DateTime::parse_from_rfc3339(v.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(Utc::now)
}

/// Keep only articles whose category label is one of `topics`.
pub(crate) fn retain_topics(articles: &mut Vec<Article>, topics: Option<&[String]>) {
    if let Some(topics) = topics {
        articles.retain(|article| topics.iter().any(|t| t == article.category.label()));
    }
}

/// Static article used in fallback lists. Links are placeholders until the
/// aggregator resolves them.
pub(crate) fn canned(
    id: &str,
    headline: &str,
    summary: &str,
    category: Topic,
    source_name: &str,
    hours_ago: i64,
) -> Article {
    Article {
        id: id.to_string(),
        headline: headline.to_string(),
        summary: summary.to_string(),
        category,
        sources: vec![ArticleSource::placeholder(source_name)],
        published_at: Utc::now() - Duration::hours(hours_ago),
    }
}

use crate::types::{AggregatorError, Article, Result};
use async_trait::async_trait;
use std::fmt;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SourceKind {
    Guardian,
    Yle,
    Reddit,
    Bbc,
}

impl fmt::Display for SourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SourceKind::Guardian => "guardian",
            SourceKind::Yle => "yle",
            SourceKind::Reddit => "reddit",
            SourceKind::Bbc => "bbc",
        };
        f.write_str(name)
    }
}

/// A single upstream news source translated into the common article shape.
#[async_trait]
pub trait NewsSource: Send + Sync {
    fn kind(&self) -> SourceKind;

    /// Human-readable name used in logs and article attribution
    fn source_name(&self) -> String;

    /// Fetch and convert native items. May fail; callers normally go
    /// through [`NewsSource::fetch`] instead.
    async fn pull(&self, topics: Option<&[String]>) -> Result<Vec<Article>>;

    /// Canned articles served whenever `pull` cannot produce any.
    fn fallback_articles(&self, topics: Option<&[String]>) -> Vec<Article>;

    /// Whether the source can fetch per topic.
    fn supports_topics(&self) -> bool {
        false
    }

    /// A real URL to replace a placeholder link on one of this source's
    /// articles, if the source knows one.
    fn resolve_url(&self, _article: &Article) -> Option<String> {
        None
    }

    /// Never fails: any error from `pull`, or an empty successful pull,
    /// yields the fallback list.
    async fn fetch(&self, topics: Option<&[String]>) -> Vec<Article> {
        match self.pull(topics).await {
            Ok(articles) if !articles.is_empty() => {
                info!("{} returned {} articles", self.source_name(), articles.len());
                articles
            }
            Ok(_) => {
                info!("{} returned no articles, serving fallback", self.source_name());
                self.fallback_articles(topics)
            }
            Err(AggregatorError::NotConfigured { .. }) => {
                info!("{} is not configured, serving fallback", self.source_name());
                self.fallback_articles(topics)
            }
            Err(e) => {
                warn!("{} fetch failed, serving fallback: {}", self.source_name(), e);
                self.fallback_articles(topics)
            }
        }
    }
}

use crate::fetcher::Fetcher;
use crate::settings::SettingsStore;
use crate::sources::{BbcSource, GuardianSource, RedditSource, YleSource};
use crate::traits::NewsSource;
use crate::types::{
    Advisory, AggregatorConfig, ApiCredentials, Article, FetchConfig, KeyValueStore, NewsFeed,
    Result,
};
use std::sync::Arc;
use tracing::{debug, error, info};

/// Fans out to every configured source and merges the results into one
/// newest-first list.
pub struct NewsAggregator {
    sources: Vec<Arc<dyn NewsSource>>,
    config: AggregatorConfig,
}

impl NewsAggregator {
    pub fn new(sources: Vec<Arc<dyn NewsSource>>, config: AggregatorConfig) -> Self {
        Self { sources, config }
    }

    /// Guardian, YLE, Reddit and BBC sharing one HTTP client.
    pub fn with_default_sources(
        fetch_config: FetchConfig,
        credentials: ApiCredentials,
        bbc_relay: Option<String>,
    ) -> Result<Self> {
        let fetcher = Fetcher::new(fetch_config)?;

        let sources: Vec<Arc<dyn NewsSource>> = vec![
            Arc::new(GuardianSource::new(fetcher.clone(), credentials.guardian_api_key)),
            Arc::new(YleSource::new(
                fetcher.clone(),
                credentials.yle_app_id,
                credentials.yle_app_key,
            )),
            Arc::new(RedditSource::new(fetcher.clone())),
            Arc::new(BbcSource::new(fetcher).with_relay(bbc_relay)),
        ];

        Ok(Self::new(sources, AggregatorConfig::default()))
    }

    pub fn with_config(mut self, config: AggregatorConfig) -> Self {
        self.config = config;
        self
    }

    /// Every source, no topic filter.
    pub async fn fetch_all(&self) -> Vec<Article> {
        let sources: Vec<_> = self.sources.iter().cloned().collect();
        let mut articles = Self::gather(sources, None).await;

        sort_newest_first(&mut articles);
        if let Some(limit) = self.config.all_sources_limit {
            articles.truncate(limit);
        }

        info!("Aggregated {} articles from all sources", articles.len());
        articles
    }

    /// Articles for the given topic labels from the topic-capable sources.
    pub async fn fetch_by_topics(&self, topics: &[String]) -> NewsFeed {
        if topics.is_empty() {
            info!("No topics selected");
            return NewsFeed::advisory(Advisory::NoTopicsSelected);
        }

        let sources: Vec<_> = self
            .sources
            .iter()
            .filter(|source| source.supports_topics())
            .cloned()
            .collect();
        let mut articles = Self::gather(sources, Some(topics.to_vec())).await;

        articles.retain(|article| topics.iter().any(|t| t == article.category.label()));
        sort_newest_first(&mut articles);
        if let Some(limit) = self.config.topic_limit {
            articles.truncate(limit);
        }

        info!(
            "Aggregated {} articles for topics {:?}",
            articles.len(),
            topics
        );

        if articles.is_empty() {
            return NewsFeed::advisory(Advisory::NoArticlesForTopics);
        }

        NewsFeed {
            articles,
            advisory: None,
        }
    }

    /// Feed for whatever topics the user currently has enabled.
    pub async fn fetch_for_settings<S: KeyValueStore>(&self, settings: &SettingsStore<S>) -> NewsFeed {
        let topics = settings.list_enabled_labels();
        self.fetch_by_topics(&topics).await
    }

    /// One task per source; every task is awaited and results keep source
    /// order.
    async fn gather(sources: Vec<Arc<dyn NewsSource>>, topics: Option<Vec<String>>) -> Vec<Article> {
        let handles: Vec<_> = sources
            .into_iter()
            .map(|source| {
                let topics = topics.clone();
                tokio::spawn(async move {
                    let mut articles = source.fetch(topics.as_deref()).await;
                    resolve_placeholders(source.as_ref(), &mut articles);
                    (source.kind(), articles)
                })
            })
            .collect();

        let mut merged = Vec::new();
        for result in futures::future::join_all(handles).await {
            match result {
                Ok((kind, articles)) => {
                    debug!("Source {} contributed {} articles", kind, articles.len());
                    merged.extend(articles);
                }
                Err(e) => error!("Source task failed: {}", e),
            }
        }
        merged
    }
}

fn sort_newest_first(articles: &mut [Article]) {
    // sort_by is stable, ties keep source order
    articles.sort_by(|a, b| b.published_at.cmp(&a.published_at));
}

fn resolve_placeholders(source: &dyn NewsSource, articles: &mut [Article]) {
    for article in articles.iter_mut() {
        if !article.sources.iter().any(|s| s.is_placeholder()) {
            continue;
        }
        let Some(url) = source.resolve_url(article) else {
            continue;
        };
        for link in article.sources.iter_mut().filter(|s| s.is_placeholder()) {
            link.url = url.clone();
        }
    }
}

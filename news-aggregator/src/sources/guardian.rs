use crate::fetcher::Fetcher;
use crate::normalizer::{neutralize_headline, strip_markup, summarize};
use crate::sources::{canned, parse_timestamp, retain_topics};
use crate::traits::{NewsSource, SourceKind};
use crate::types::{AggregatorError, Article, ArticleSource, Result, Topic};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

pub const GUARDIAN_API_URL: &str = "https://content.guardianapis.com";
const SOURCE_NAME: &str = "The Guardian";

#[derive(Debug, Deserialize)]
struct GuardianResponse {
    response: GuardianPayload,
}

#[derive(Debug, Deserialize)]
struct GuardianPayload {
    #[serde(default)]
    results: Vec<GuardianItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianItem {
    id: String,
    web_title: String,
    web_url: Option<String>,
    section_name: Option<String>,
    web_publication_date: Option<String>,
    fields: Option<GuardianFields>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GuardianFields {
    trail_text: Option<String>,
    body_text: Option<String>,
}

/// Guardian open-platform search API
pub struct GuardianSource {
    fetcher: Fetcher,
    api_key: Option<String>,
    base_url: String,
}

impl GuardianSource {
    pub fn new(fetcher: Fetcher, api_key: Option<String>) -> Self {
        Self {
            fetcher,
            api_key,
            base_url: GUARDIAN_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Convert a search response body into articles.
    pub fn parse_response(body: &str) -> Result<Vec<Article>> {
        let response: GuardianResponse = serde_json::from_str(body)?;
        Ok(response.response.results.into_iter().map(convert_item).collect())
    }

    fn section_path(topic: Topic) -> &'static str {
        match topic {
            Topic::Uk => "uk-news",
            Topic::World => "world",
            Topic::Business => "business",
            Topic::Politics => "politics",
            Topic::Technology => "technology",
            Topic::Science => "science",
            Topic::Health => "society/health",
            Topic::Entertainment => "culture",
            Topic::Sport => "sport",
            Topic::Climate => "environment/climate-crisis",
        }
    }
}

fn convert_item(item: GuardianItem) -> Article {
    let body = item
        .fields
        .as_ref()
        .and_then(|f| {
            [f.trail_text.as_deref(), f.body_text.as_deref()]
                .into_iter()
                .flatten()
                .find(|text| !text.trim().is_empty())
        })
        .map(strip_markup);

    Article {
        id: format!("guardian-{}", item.id),
        headline: neutralize_headline(&item.web_title),
        summary: summarize(body.as_deref(), &item.web_title),
        category: Topic::classify(item.section_name.as_deref().unwrap_or_default()),
        sources: vec![match item.web_url {
            Some(url) if !url.is_empty() => ArticleSource::new(SOURCE_NAME, url),
            _ => ArticleSource::placeholder(SOURCE_NAME),
        }],
        published_at: parse_timestamp(item.web_publication_date.as_deref()),
    }
}

#[async_trait]
impl NewsSource for GuardianSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Guardian
    }

    fn source_name(&self) -> String {
        SOURCE_NAME.to_string()
    }

    async fn pull(&self, topics: Option<&[String]>) -> Result<Vec<Article>> {
        let api_key = self.api_key.as_deref().ok_or_else(|| AggregatorError::NotConfigured {
            source_name: SOURCE_NAME.to_string(),
        })?;

        let url = format!("{}/search", self.base_url.trim_end_matches('/'));
        let query = [
            ("api-key", api_key),
            ("show-fields", "trailText,bodyText"),
            ("page-size", "10"),
            ("order-by", "newest"),
        ];
        let body = self.fetcher.get_text(&url, &query).await?;

        let mut articles = Self::parse_response(&body)?;
        retain_topics(&mut articles, topics);
        info!("Guardian search produced {} articles", articles.len());
        Ok(articles)
    }

    fn fallback_articles(&self, topics: Option<&[String]>) -> Vec<Article> {
        let mut articles = vec![
            canned(
                "guardian-mock-1",
                "UK inflation rate drops to 2.1% in latest government figures",
                "Official statistics show inflation continuing its downward trend following recent monetary policy adjustments. The decrease reflects changes in energy costs and consumer spending patterns across multiple sectors.",
                Topic::Business,
                SOURCE_NAME,
                1,
            ),
            canned(
                "guardian-mock-2",
                "Scientists report breakthrough in renewable energy storage",
                "Researchers developed a new battery technology that could store renewable energy for extended periods. The innovation addresses one of the key challenges in transitioning to sustainable power systems.",
                Topic::Science,
                SOURCE_NAME,
                3,
            ),
        ];
        retain_topics(&mut articles, topics);
        articles
    }

    fn resolve_url(&self, article: &Article) -> Option<String> {
        Some(format!(
            "https://www.theguardian.com/{}",
            Self::section_path(article.category)
        ))
    }
}

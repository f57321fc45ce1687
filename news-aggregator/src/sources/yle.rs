use crate::fetcher::Fetcher;
use crate::normalizer::{neutralize_headline, summarize};
use crate::sources::{canned, parse_timestamp, retain_topics};
use crate::traits::{NewsSource, SourceKind};
use crate::types::{AggregatorError, Article, ArticleSource, Result, Topic};
use async_trait::async_trait;
use serde::Deserialize;
use tracing::info;

pub const YLE_API_URL: &str = "https://external.api.yle.fi/v1";
const SOURCE_NAME: &str = "YLE";
const DEFAULT_TITLE: &str = "Finnish News";

#[derive(Debug, Default, Deserialize)]
struct LocalizedText {
    en: Option<String>,
    fi: Option<String>,
    sv: Option<String>,
}

impl LocalizedText {
    /// English first, then Finnish, then Swedish.
    fn preferred(&self) -> Option<&str> {
        [self.en.as_deref(), self.fi.as_deref(), self.sv.as_deref()]
            .into_iter()
            .flatten()
            .find(|text| !text.trim().is_empty())
    }
}

#[derive(Debug, Deserialize)]
struct YleResponse {
    #[serde(default)]
    data: Vec<YleItem>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct YleItem {
    id: String,
    #[serde(default)]
    title: LocalizedText,
    #[serde(default)]
    description: LocalizedText,
    #[serde(default)]
    subject: Vec<YleSubject>,
    date_published: Option<String>,
    url: Option<YleUrl>,
}

#[derive(Debug, Deserialize)]
struct YleSubject {
    #[serde(default)]
    title: LocalizedText,
}

#[derive(Debug, Deserialize)]
struct YleUrl {
    full: Option<String>,
}

pub struct YleSource {
    fetcher: Fetcher,
    app_id: Option<String>,
    app_key: Option<String>,
    base_url: String,
}

impl YleSource {
    pub fn new(fetcher: Fetcher, app_id: Option<String>, app_key: Option<String>) -> Self {
        Self {
            fetcher,
            app_id,
            app_key,
            base_url: YLE_API_URL.to_string(),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn parse_response(body: &str) -> Result<Vec<Article>> {
        let response: YleResponse = serde_json::from_str(body)?;
        Ok(response.data.into_iter().map(convert_item).collect())
    }
}

fn convert_item(item: YleItem) -> Article {
    let title = item.title.preferred().unwrap_or(DEFAULT_TITLE);
    let category = item
        .subject
        .first()
        .and_then(|subject| subject.title.preferred())
        .map(Topic::classify)
        .unwrap_or(Topic::World);
    let url = item.url.and_then(|u| u.full).filter(|u| !u.is_empty());

    Article {
        id: format!("yle-{}", item.id),
        headline: neutralize_headline(title),
        summary: summarize(item.description.preferred(), title),
        category,
        sources: vec![match url {
            Some(url) => ArticleSource::new(SOURCE_NAME, url),
            None => ArticleSource::placeholder(SOURCE_NAME),
        }],
        published_at: parse_timestamp(item.date_published.as_deref()),
    }
}

#[async_trait]
impl NewsSource for YleSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Yle
    }

    fn source_name(&self) -> String {
        SOURCE_NAME.to_string()
    }

    async fn pull(&self, topics: Option<&[String]>) -> Result<Vec<Article>> {
        let (app_id, app_key) = match (self.app_id.as_deref(), self.app_key.as_deref()) {
            (Some(id), Some(key)) => (id, key),
            _ => {
                return Err(AggregatorError::NotConfigured {
                    source_name: SOURCE_NAME.to_string(),
                })
            }
        };

        let url = format!("{}/programs/items.json", self.base_url.trim_end_matches('/'));
        let query = [
            ("app_id", app_id),
            ("app_key", app_key),
            ("limit", "10"),
            ("type", "article"),
            ("availability", "ondemand"),
        ];
        let body = self.fetcher.get_text(&url, &query).await?;

        let mut articles = Self::parse_response(&body)?;
        retain_topics(&mut articles, topics);
        info!("YLE items produced {} articles", articles.len());
        Ok(articles)
    }

    fn fallback_articles(&self, topics: Option<&[String]>) -> Vec<Article> {
        let mut articles = vec![
            canned(
                "yle-mock-1",
                "Helsinki introduces new public transportation routes",
                "The city announced expansion of bus and tram services to better connect suburban areas with the city center. The changes aim to improve accessibility and reduce private vehicle usage.",
                Topic::World,
                SOURCE_NAME,
                2,
            ),
            canned(
                "yle-mock-2",
                "Finnish education system receives international recognition",
                "UNESCO praised Finland's educational approach in a new report highlighting innovative teaching methods and student well-being initiatives. The recognition reinforces Finland's position in global education rankings.",
                Topic::World,
                SOURCE_NAME,
                4,
            ),
        ];
        retain_topics(&mut articles, topics);
        articles
    }

    fn resolve_url(&self, _article: &Article) -> Option<String> {
        Some("https://yle.fi/news".to_string())
    }
}

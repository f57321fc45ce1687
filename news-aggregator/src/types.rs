// Core data model lives in the interfaces crate
pub use interfaces::defs::{AppSettings, Article, ArticleSource, Topic, TopicSetting, PLACEHOLDER_URL};
pub use interfaces::state::KeyValueStore;

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub connect_timeout_seconds: u64,
    pub max_response_size_mb: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Up-to-date/1.0".to_string(),
            timeout_seconds: 10,
            connect_timeout_seconds: 5,
            max_response_size_mb: 5,
        }
    }
}

/// Credentials for the keyed upstream APIs. A missing value means the
/// corresponding source serves its canned articles.
#[derive(Debug, Clone, Default)]
pub struct ApiCredentials {
    pub guardian_api_key: Option<String>,
    pub yle_app_id: Option<String>,
    pub yle_app_key: Option<String>,
}

impl ApiCredentials {
    pub fn from_env() -> Self {
        Self {
            guardian_api_key: env_credential("GUARDIAN_API_KEY"),
            yle_app_id: env_credential("YLE_APP_ID"),
            yle_app_key: env_credential("YLE_API_KEY"),
        }
    }
}

fn env_credential(name: &str) -> Option<String> {
    std::env::var(name).ok().and_then(|value| credential(&value))
}

/// Empty strings and the `YOUR_..._HERE` template values count as unset.
pub fn credential(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() || (value.starts_with("YOUR_") && value.ends_with("_HERE")) {
        None
    } else {
        Some(value.to_string())
    }
}

#[derive(Debug, Clone)]
pub struct AggregatorConfig {
    /// Cap applied when every source is merged.
    pub all_sources_limit: Option<usize>,
    /// Cap applied on the topic-filtered path; unbounded by default.
    pub topic_limit: Option<usize>,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            all_sources_limit: Some(20),
            topic_limit: None,
        }
    }
}

/// Non-error explanation handed to the consumer alongside an empty feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Advisory {
    NoTopicsSelected,
    NoArticlesForTopics,
}

impl Advisory {
    pub fn message(&self) -> &'static str {
        match self {
            Advisory::NoTopicsSelected => {
                "No topics selected. Please enable at least one topic in Settings."
            }
            Advisory::NoArticlesForTopics => "No news articles found for selected topics.",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewsFeed {
    pub articles: Vec<Article>,
    pub advisory: Option<Advisory>,
}

impl NewsFeed {
    pub fn advisory(advisory: Advisory) -> Self {
        Self {
            articles: Vec::new(),
            advisory: Some(advisory),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    Status { status: u16, url: String },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("JSON decode error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("{source_name} is not configured")]
    NotConfigured { source_name: String },

    #[error("Response size exceeds limit: {size_mb}MB")]
    ResponseTooLarge { size_mb: usize },

    #[error("General error: {0}")]
    General(String),
}

pub type Result<T> = std::result::Result<T, AggregatorError>;

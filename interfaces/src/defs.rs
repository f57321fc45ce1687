use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Source URL value for articles whose link has not been resolved yet.
pub const PLACEHOLDER_URL: &str = "#";

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Topic {
    #[serde(rename = "UK")]
    Uk,
    World,
    Business,
    Politics,
    Technology,
    Science,
    Health,
    #[serde(rename = "Entertainment & Arts")]
    Entertainment,
    Sport,
    Climate,
}

impl Topic {
    pub const ALL: [Topic; 10] = [
        Topic::Uk,
        Topic::World,
        Topic::Business,
        Topic::Politics,
        Topic::Technology,
        Topic::Science,
        Topic::Health,
        Topic::Entertainment,
        Topic::Sport,
        Topic::Climate,
    ];

    /// Display label, also the join key against persisted settings.
    pub fn label(&self) -> &'static str {
        match self {
            Topic::Uk => "UK",
            Topic::World => "World",
            Topic::Business => "Business",
            Topic::Politics => "Politics",
            Topic::Technology => "Technology",
            Topic::Science => "Science",
            Topic::Health => "Health",
            Topic::Entertainment => "Entertainment & Arts",
            Topic::Sport => "Sport",
            Topic::Climate => "Climate",
        }
    }

    /// Lowercase identifier shared by topic settings and per-topic feeds.
    pub fn key(&self) -> &'static str {
        match self {
            Topic::Uk => "uk",
            Topic::World => "world",
            Topic::Business => "business",
            Topic::Politics => "politics",
            Topic::Technology => "technology",
            Topic::Science => "science",
            Topic::Health => "health",
            Topic::Entertainment => "entertainment",
            Topic::Sport => "sport",
            Topic::Climate => "climate",
        }
    }

    pub fn enabled_by_default(&self) -> bool {
        !matches!(self, Topic::Entertainment | Topic::Sport | Topic::Climate)
    }

    pub fn from_label(label: &str) -> Option<Topic> {
        Topic::ALL.into_iter().find(|topic| topic.label() == label)
    }

    /// Map a free-form section or subject name onto the closed topic set.
    /// Anything unrecognized lands in `World`.
    pub fn classify(section: &str) -> Topic {
        let section = section.trim().to_lowercase();
        if let Some(topic) = Topic::ALL.into_iter().find(|t| t.label().to_lowercase() == section) {
            return topic;
        }

        // First match wins, so narrower needles precede broader ones
        const TABLE: &[(&str, Topic)] = &[
            ("uk news", Topic::Uk),
            ("britain", Topic::Uk),
            ("politic", Topic::Politics),
            ("election", Topic::Politics),
            ("business", Topic::Business),
            ("money", Topic::Business),
            ("econom", Topic::Business),
            ("tech", Topic::Technology),
            ("climate", Topic::Climate),
            ("science", Topic::Science),
            ("environment", Topic::Climate),
            ("health", Topic::Health),
            ("society", Topic::Health),
            ("sport", Topic::Sport),
            ("football", Topic::Sport),
            ("culture", Topic::Entertainment),
            ("film", Topic::Entertainment),
            ("music", Topic::Entertainment),
            ("books", Topic::Entertainment),
            ("art and design", Topic::Entertainment),
            ("stage", Topic::Entertainment),
            ("tv and radio", Topic::Entertainment),
            ("television", Topic::Entertainment),
        ];

        TABLE
            .iter()
            .find(|(needle, _)| section.contains(needle))
            .map(|(_, topic)| *topic)
            .unwrap_or(Topic::World)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleSource {
    pub name: String,
    pub url: String,
}

impl ArticleSource {
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            url: url.into(),
        }
    }

    pub fn placeholder(name: impl Into<String>) -> Self {
        Self::new(name, PLACEHOLDER_URL)
    }

    pub fn is_placeholder(&self) -> bool {
        self.url == PLACEHOLDER_URL
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub headline: String,
    pub summary: String,
    pub category: Topic,
    pub sources: Vec<ArticleSource>,
    pub published_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicSetting {
    pub id: String,
    pub label: String,
    pub enabled: bool,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub enabled_topics: Vec<String>,
    pub last_updated: DateTime<Utc>,
}

impl AppSettings {
    pub fn default_enabled_topics() -> Vec<String> {
        Topic::ALL
            .iter()
            .filter(|topic| topic.enabled_by_default())
            .map(|topic| topic.label().to_owned())
            .collect()
    }
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            enabled_topics: Self::default_enabled_topics(),
            last_updated: Utc::now(),
        }
    }
}

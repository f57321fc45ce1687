use crate::fetcher::Fetcher;
use crate::normalizer::{neutralize_headline, strip_markup, summarize};
use crate::parser::{FeedParser, ParsedEntry};
use crate::sources::{canned, retain_topics};
use crate::traits::{NewsSource, SourceKind};
use crate::types::{AggregatorError, Article, ArticleSource, Result, Topic};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::BTreeMap;
use tracing::{debug, info, warn};

const SOURCE_NAME: &str = "BBC News";

/// Public relay that wraps a fetched document as `{"contents": "..."}`.
pub const ALLORIGINS_RELAY: &str = "https://api.allorigins.win/get";

pub fn default_feeds() -> BTreeMap<Topic, String> {
    [
        (Topic::Uk, "http://feeds.bbci.co.uk/news/uk/rss.xml"),
        (Topic::World, "http://feeds.bbci.co.uk/news/world/rss.xml"),
        (Topic::Business, "http://feeds.bbci.co.uk/news/business/rss.xml"),
        (Topic::Politics, "http://feeds.bbci.co.uk/news/politics/rss.xml"),
        (Topic::Technology, "http://feeds.bbci.co.uk/news/technology/rss.xml"),
        (Topic::Science, "http://feeds.bbci.co.uk/news/science_and_environment/rss.xml"),
        (Topic::Health, "http://feeds.bbci.co.uk/news/health/rss.xml"),
        (Topic::Entertainment, "http://feeds.bbci.co.uk/news/entertainment_and_arts/rss.xml"),
        (Topic::Sport, "http://feeds.bbci.co.uk/sport/rss.xml"),
        (Topic::Climate, "http://feeds.bbci.co.uk/news/science_and_environment/rss.xml"),
    ]
    .into_iter()
    .map(|(topic, url)| (topic, url.to_string()))
    .collect()
}

/// Bare relay endpoint. A trailing `?url=` prefix is dropped because the
/// feed URL is sent as its own query parameter.
pub fn relay_endpoint(relay: &str) -> String {
    let relay = relay.trim();
    relay
        .strip_suffix("url=")
        .unwrap_or(relay)
        .trim_end_matches(['?', '&'])
        .to_string()
}

/// BBC per-topic RSS feeds, optionally read through a CORS relay.
pub struct BbcSource {
    fetcher: Fetcher,
    feeds: BTreeMap<Topic, String>,
    relay: Option<String>,
}

impl BbcSource {
    pub fn new(fetcher: Fetcher) -> Self {
        Self {
            fetcher,
            feeds: default_feeds(),
            relay: None,
        }
    }

    pub fn with_feeds(mut self, feeds: BTreeMap<Topic, String>) -> Self {
        self.feeds = feeds;
        self
    }

    pub fn with_relay(mut self, relay: Option<String>) -> Self {
        self.relay = relay.map(|r| relay_endpoint(&r));
        self
    }

    /// Topics to fetch for the given labels. Labels without a configured
    /// feed are skipped, not treated as errors.
    pub fn feed_topics(&self, topics: Option<&[String]>) -> Vec<Topic> {
        let Some(labels) = topics else {
            return self.feeds.keys().copied().collect();
        };

        let mut selected = Vec::new();
        for label in labels {
            match Topic::from_label(label).filter(|topic| self.feeds.contains_key(topic)) {
                Some(topic) if !selected.contains(&topic) => selected.push(topic),
                Some(_) => {}
                None => debug!("No BBC feed configured for topic: {}", label),
            }
        }
        selected
    }

    /// Convert parsed feed entries for one topic.
    pub fn convert_entries(entries: Vec<ParsedEntry>, topic: Topic) -> Vec<Article> {
        entries
            .into_iter()
            .enumerate()
            .map(|(index, entry)| {
                let description = entry.description.as_deref().map(strip_markup);
                Article {
                    id: entry
                        .guid
                        .unwrap_or_else(|| format!("bbc-{}-{}", topic.key(), index)),
                    headline: neutralize_headline(&entry.title),
                    summary: summarize(description.as_deref(), &entry.title),
                    category: topic,
                    sources: vec![ArticleSource::new(SOURCE_NAME, entry.url)],
                    published_at: entry.published_at.unwrap_or_else(Utc::now),
                }
            })
            .collect()
    }

    async fn fetch_topic(&self, topic: Topic) -> Result<Vec<Article>> {
        let feed_url = self
            .feeds
            .get(&topic)
            .ok_or_else(|| AggregatorError::General(format!("No BBC feed for {}", topic.label())))?;

        let xml = match &self.relay {
            Some(relay) => {
                let body = self.fetcher.get_text(relay, &[("url", feed_url.as_str())]).await?;
                FeedParser::unwrap_relay_envelope(&body)?
            }
            None => self.fetcher.get_text(feed_url, &[]).await?,
        };

        let entries = FeedParser::new().parse_feed(&xml)?;
        Ok(Self::convert_entries(entries, topic))
    }

    fn section_url(topic: Topic) -> String {
        let path = match topic {
            Topic::Uk => "news/uk",
            Topic::World => "news/world",
            Topic::Business => "news/business",
            Topic::Politics => "news/politics",
            Topic::Technology => "news/technology",
            Topic::Science | Topic::Climate => "news/science-environment",
            Topic::Health => "news/health",
            Topic::Entertainment => "news/entertainment-arts",
            Topic::Sport => "sport",
        };
        format!("https://www.bbc.com/{}", path)
    }
}

#[async_trait]
impl NewsSource for BbcSource {
    fn kind(&self) -> SourceKind {
        SourceKind::Bbc
    }

    fn source_name(&self) -> String {
        SOURCE_NAME.to_string()
    }

    async fn pull(&self, topics: Option<&[String]>) -> Result<Vec<Article>> {
        let feed_topics = self.feed_topics(topics);
        if feed_topics.is_empty() {
            return Ok(Vec::new());
        }

        let results = futures::future::join_all(
            feed_topics.iter().map(|topic| self.fetch_topic(*topic)),
        )
        .await;

        let mut articles = Vec::new();
        let mut failures = 0;
        for (topic, result) in feed_topics.iter().zip(results) {
            match result {
                Ok(items) => articles.extend(items),
                Err(e) => {
                    failures += 1;
                    warn!("Error fetching BBC feed for {}: {}", topic.label(), e);
                }
            }
        }

        if failures == feed_topics.len() {
            return Err(AggregatorError::General(format!(
                "All {} BBC feeds failed",
                failures
            )));
        }

        info!(
            "BBC feeds produced {} articles from {} topics",
            articles.len(),
            feed_topics.len() - failures
        );
        Ok(articles)
    }

    fn supports_topics(&self) -> bool {
        true
    }

    fn fallback_articles(&self, topics: Option<&[String]>) -> Vec<Article> {
        let mut articles: Vec<Article> = FALLBACK
            .iter()
            .enumerate()
            .map(|(index, (headline, summary, category))| {
                canned(
                    &format!("bbc-{}", index + 1),
                    headline,
                    summary,
                    *category,
                    SOURCE_NAME,
                    index as i64 + 1,
                )
            })
            .collect();
        retain_topics(&mut articles, topics);
        articles
    }

    fn resolve_url(&self, article: &Article) -> Option<String> {
        Some(Self::section_url(article.category))
    }
}

const FALLBACK: [(&str, &str, Topic); 18] = [
    (
        "International climate conference reaches agreement on renewable energy targets",
        "Representatives from 195 countries established new framework for accelerating renewable energy adoption over the next decade. The agreement includes specific commitments for solar and wind power development.",
        Topic::Climate,
    ),
    (
        "Medical breakthrough shows promise for early alzheimer detection",
        "Researchers developed new brain imaging technology that can identify alzheimer-related changes years before symptoms appear. The method could enable earlier intervention and treatment.",
        Topic::Health,
    ),
    (
        "Global ocean cleanup initiative removes record amount of plastic waste",
        "Environmental project successfully collected over 100,000 tons of plastic debris from Pacific waters this year. The initiative demonstrates scalable solutions for addressing marine pollution.",
        Topic::Climate,
    ),
    (
        "Archaeological discovery reveals ancient trade networks in mediterranean",
        "Excavations uncovered evidence of sophisticated trading relationships between civilizations 3,000 years ago. The findings challenge existing theories about ancient economic systems.",
        Topic::Science,
    ),
    (
        "New satellite technology improves disaster early warning systems",
        "Advanced monitoring satellites launched this month provide more accurate predictions for earthquakes and severe weather events. The technology could save thousands of lives annually.",
        Topic::Technology,
    ),
    (
        "International education report highlights digital learning progress",
        "UNESCO study shows significant improvements in student outcomes using new educational technology platforms. The research covers 40 countries across urban and rural environments.",
        Topic::World,
    ),
    (
        "Scientific collaboration produces breakthrough in cancer treatment",
        "International research team developed new immunotherapy approach showing remarkable success in clinical trials. The treatment targets multiple cancer types with minimal side effects.",
        Topic::Health,
    ),
    (
        "Global food security initiative addresses hunger in developing regions",
        "World Food Programme launched comprehensive program to improve agricultural productivity and food distribution. The initiative focuses on sustainable farming practices and local capacity building.",
        Topic::World,
    ),
    (
        "Urban planning innovation reduces traffic congestion in major cities",
        "Smart city technologies implemented across 15 metropolitan areas show significant improvements in traffic flow and air quality. The systems use AI to optimize transportation networks.",
        Topic::Technology,
    ),
    (
        "Wildlife conservation efforts show positive results for endangered species",
        "Recent surveys indicate population increases for several critically endangered species across multiple continents. Conservation programs demonstrate success through community-based approaches.",
        Topic::Science,
    ),
    (
        "International space collaboration advances mars exploration timeline",
        "Space agencies announced joint mission planning for human mars exploration within the next 15 years. The collaboration includes shared technology development and astronaut training programs.",
        Topic::Science,
    ),
    (
        "Economic analysis shows steady growth in renewable energy investments",
        "Financial reports indicate renewable energy attracted record investment levels this year. Solar and wind projects received 40% more funding compared to previous year.",
        Topic::Business,
    ),
    (
        "Mental health research reveals effective community support programs",
        "Studies demonstrate significant improvements in mental health outcomes through peer support networks and community-based interventions. The programs show promise for scalable implementation.",
        Topic::Health,
    ),
    (
        "Agricultural innovation helps farmers adapt to changing climate conditions",
        "New drought-resistant crop varieties and precision farming techniques enable farmers to maintain productivity despite weather challenges. The innovations support food security goals.",
        Topic::Climate,
    ),
    (
        "Cultural heritage preservation uses digital technology for historical sites",
        "Archaeologists employ advanced 3D scanning and virtual reality to document and preserve historical monuments. The technology enables remote access to cultural heritage sites.",
        Topic::Entertainment,
    ),
    (
        "UK chancellor announces new infrastructure investment package",
        "The government revealed plans for £50 billion investment in rail, broadband, and renewable energy infrastructure over five years. The package aims to boost economic growth and support regional development.",
        Topic::Uk,
    ),
    (
        "European parliament approves new digital services regulations",
        "MEPs voted to strengthen oversight of major technology platforms with new rules on content moderation and data handling. The legislation aims to protect users while preserving innovation.",
        Topic::Politics,
    ),
    (
        "Premier league clubs report record attendance figures for season",
        "English football stadiums welcomed their highest number of spectators in decades, with average attendance reaching 95% capacity. The figures reflect renewed fan enthusiasm following pandemic restrictions.",
        Topic::Sport,
    ),
];

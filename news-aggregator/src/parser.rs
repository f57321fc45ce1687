use crate::types::{AggregatorError, Result};
use chrono::{DateTime, Utc};
use feed_rs::parser;
use serde::Deserialize;
use std::collections::HashSet;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct ParsedEntry {
    pub guid: Option<String>,
    pub url: String,
    pub title: String,
    pub description: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Envelope returned by allorigins-style CORS relays.
#[derive(Debug, Deserialize)]
struct RelayEnvelope {
    contents: Option<String>,
}

pub struct FeedParser {
    seen_guids: HashSet<String>,
    seen_urls: HashSet<String>,
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            seen_guids: HashSet::new(),
            seen_urls: HashSet::new(),
        }
    }

    pub fn parse_feed(&mut self, content: &str) -> Result<Vec<ParsedEntry>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let entries: Vec<ParsedEntry> = feed
            .entries
            .into_iter()
            .filter_map(|entry| self.parse_entry(entry))
            .collect();

        info!("Parsed feed with {} entries", entries.len());
        Ok(entries)
    }

    fn parse_entry(&mut self, entry: feed_rs::model::Entry) -> Option<ParsedEntry> {
        let title = entry.title.map(|t| t.content.trim().to_string())?;
        if title.is_empty() {
            return None;
        }

        let url = entry.links.first()?.href.clone();

        let guid = if !entry.id.is_empty() {
            Some(entry.id.clone())
        } else {
            None
        };

        if let Some(ref guid) = guid {
            if !self.seen_guids.insert(guid.clone()) {
                debug!("Skipping duplicate entry with GUID: {}", guid);
                return None;
            }
        }

        if !self.seen_urls.insert(url.clone()) {
            debug!("Skipping duplicate entry with URL: {}", url);
            return None;
        }

        let description = entry
            .summary
            .map(|s| s.content)
            .or_else(|| entry.content.and_then(|c| c.body));

        let published_at = entry.published.or(entry.updated);

        Some(ParsedEntry {
            guid,
            url,
            title,
            description,
            published_at,
        })
    }

    /// Unwrap the feed document from a relay JSON response.
    pub fn unwrap_relay_envelope(body: &str) -> Result<String> {
        let envelope: RelayEnvelope = serde_json::from_str(body)?;
        match envelope.contents {
            Some(contents) if !contents.trim().is_empty() => Ok(contents),
            _ => Err(AggregatorError::Parse("Relay response has no contents".to_string())),
        }
    }
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

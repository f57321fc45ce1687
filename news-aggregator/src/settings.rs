//! Topic preferences persisted as a single JSON record.
//!
//! The store never reports storage problems to its caller: an unreadable or
//! malformed record behaves like a missing one, and failed writes are logged.

use crate::types::{AppSettings, KeyValueStore, Topic, TopicSetting};
use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{error, info, warn};

pub const SETTINGS_STORAGE_KEY: &str = "up-to-date-settings";

/// Topics reinstated when every topic has been switched off.
pub const MINIMUM_TOPICS: [&str; 2] = ["UK", "World"];

pub struct SettingsStore<S: KeyValueStore> {
    storage: S,
}

impl<S: KeyValueStore> SettingsStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub fn load(&self) -> AppSettings {
        let raw = match self.storage.get(SETTINGS_STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return AppSettings::default(),
            Err(e) => {
                warn!("Settings storage unavailable, using defaults: {:#}", e);
                return AppSettings::default();
            }
        };

        let value = match serde_json::from_str::<Value>(&raw) {
            Ok(value @ Value::Object(_)) => value,
            Ok(_) => {
                warn!("Stored settings are not an object, using defaults");
                return AppSettings::default();
            }
            Err(e) => {
                warn!("Stored settings are not valid JSON, using defaults: {}", e);
                return AppSettings::default();
            }
        };

        let enabled_topics = value
            .get("enabledTopics")
            .and_then(|topics| serde_json::from_value::<Vec<String>>(topics.clone()).ok())
            .map(known_labels)
            .unwrap_or_else(AppSettings::default_enabled_topics);

        let last_updated = value
            .get("lastUpdated")
            .and_then(Value::as_str)
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or_else(Utc::now);

        AppSettings {
            enabled_topics,
            last_updated,
        }
    }

    /// Refreshes `last_updated` and writes the record. Best effort.
    pub fn save(&self, settings: &mut AppSettings) {
        settings.last_updated = Utc::now();

        let json = match serde_json::to_string(settings) {
            Ok(json) => json,
            Err(e) => {
                error!("Error serializing settings: {}", e);
                return;
            }
        };

        if let Err(e) = self.storage.set(SETTINGS_STORAGE_KEY, &json) {
            error!("Error saving settings: {:#}", e);
        }
    }

    /// Returns whether the stored topic list changed. Unknown labels cannot
    /// be enabled.
    pub fn set_topic_enabled(&self, label: &str, enabled: bool) -> bool {
        if enabled && Topic::from_label(label).is_none() {
            warn!("Ignoring unknown topic label: {}", label);
            return false;
        }

        let mut settings = self.load();
        let present = settings.enabled_topics.iter().any(|t| t == label);

        let changed = match (enabled, present) {
            (true, false) => {
                settings.enabled_topics.push(label.to_string());
                true
            }
            (false, true) => {
                settings.enabled_topics.retain(|t| t != label);
                true
            }
            _ => false,
        };

        if changed {
            self.save(&mut settings);
        }
        changed
    }

    /// Reinstate the minimum topics if none are enabled. Returns whether a
    /// repair happened.
    pub fn ensure_minimum_enabled(&self) -> bool {
        let mut settings = self.load();
        if !settings.enabled_topics.is_empty() {
            return false;
        }

        settings.enabled_topics = MINIMUM_TOPICS.iter().map(|t| t.to_string()).collect();
        self.save(&mut settings);
        info!("No topics enabled, restored {:?}", MINIMUM_TOPICS);
        true
    }

    /// Toggle followed by the minimum-topics repair.
    pub fn update_topic(&self, label: &str, enabled: bool) -> bool {
        let changed = self.set_topic_enabled(label, enabled);
        self.ensure_minimum_enabled();
        changed
    }

    pub fn list_enabled_labels(&self) -> Vec<String> {
        self.load().enabled_topics
    }

    pub fn has_enabled_topics(&self) -> bool {
        !self.list_enabled_labels().is_empty()
    }

    pub fn topic_settings(&self) -> Vec<TopicSetting> {
        let enabled = self.list_enabled_labels();
        Topic::ALL
            .iter()
            .map(|topic| TopicSetting {
                id: topic.key().to_string(),
                label: topic.label().to_string(),
                enabled: enabled.iter().any(|label| label == topic.label()),
            })
            .collect()
    }

    /// Drop the stored record so the defaults apply again.
    pub fn reset(&self) {
        if let Err(e) = self.storage.remove(SETTINGS_STORAGE_KEY) {
            error!("Error resetting settings: {:#}", e);
        }
    }
}

/// Stored labels outside the known topic set are dropped on read.
fn known_labels(labels: Vec<String>) -> Vec<String> {
    labels
        .into_iter()
        .filter(|label| {
            let known = Topic::from_label(label).is_some();
            if !known {
                warn!("Dropping unknown stored topic label: {}", label);
            }
            known
        })
        .collect()
}

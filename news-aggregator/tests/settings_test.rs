use news_aggregator::settings::{MINIMUM_TOPICS, SETTINGS_STORAGE_KEY};
use news_aggregator::{AppSettings, FileStore, KeyValueStore, MemoryStore, SettingsStore, Topic};

/// Storage that refuses every operation.
struct BrokenStore;

impl KeyValueStore for BrokenStore {
    fn get(&self, _key: &str) -> anyhow::Result<Option<String>> {
        anyhow::bail!("storage offline")
    }

    fn set(&self, _key: &str, _value: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage offline")
    }

    fn remove(&self, _key: &str) -> anyhow::Result<()> {
        anyhow::bail!("storage offline")
    }
}

#[test]
fn test_missing_record_yields_defaults() {
    let settings = SettingsStore::new(MemoryStore::new());
    let loaded = settings.load();

    assert_eq!(loaded.enabled_topics, AppSettings::default_enabled_topics());
    assert!(!loaded.enabled_topics.iter().any(|t| t == "Sport"));
    assert!(settings.has_enabled_topics());
}

#[test]
fn test_save_then_load_preserves_topics() {
    let settings = SettingsStore::new(MemoryStore::new());
    let mut current = settings.load();
    current.enabled_topics = vec!["Sport".to_string(), "UK".to_string(), "Climate".to_string()];
    let before = current.last_updated;

    settings.save(&mut current);
    assert!(current.last_updated >= before);

    let loaded = settings.load();
    assert_eq!(loaded.enabled_topics, vec!["Sport", "UK", "Climate"]);

    let raw = settings.storage().get(SETTINGS_STORAGE_KEY).unwrap().unwrap();
    assert!(raw.contains("\"enabledTopics\""));
    assert!(raw.contains("\"lastUpdated\""));
}

#[test]
fn test_disabling_everything_then_repair() {
    let settings = SettingsStore::new(MemoryStore::new());

    for label in settings.list_enabled_labels() {
        assert!(settings.set_topic_enabled(&label, false));
    }
    assert!(!settings.has_enabled_topics());
    assert!(settings.list_enabled_labels().is_empty());

    assert!(settings.ensure_minimum_enabled());
    assert_eq!(settings.list_enabled_labels(), MINIMUM_TOPICS.to_vec());
    assert!(!settings.ensure_minimum_enabled());
}

#[test]
fn test_toggle_is_idempotent_and_ignores_unknown_labels() {
    let settings = SettingsStore::new(MemoryStore::new());

    assert!(settings.set_topic_enabled("Sport", true));
    assert!(!settings.set_topic_enabled("Sport", true));
    assert_eq!(
        settings.list_enabled_labels().iter().filter(|t| *t == "Sport").count(),
        1
    );

    assert!(!settings.set_topic_enabled("Gardening", true));
    assert!(!settings.list_enabled_labels().iter().any(|t| t == "Gardening"));
}

#[test]
fn test_update_topic_never_leaves_zero_topics() {
    let settings = SettingsStore::new(MemoryStore::new());
    let mut current = settings.load();
    current.enabled_topics = vec!["Health".to_string()];
    settings.save(&mut current);

    assert!(settings.update_topic("Health", false));
    assert_eq!(settings.list_enabled_labels(), vec!["UK", "World"]);
}

#[test]
fn test_topic_settings_cover_every_topic() {
    let settings = SettingsStore::new(MemoryStore::new());
    let topics = settings.topic_settings();

    assert_eq!(topics.len(), Topic::ALL.len());
    let sport = topics.iter().find(|t| t.label == "Sport").unwrap();
    assert!(!sport.enabled);
    let uk = topics.iter().find(|t| t.label == "UK").unwrap();
    assert!(uk.enabled);
}

#[test]
fn test_malformed_records_fall_back_to_defaults() {
    let store = MemoryStore::new();
    store.set(SETTINGS_STORAGE_KEY, "{not json").unwrap();
    let settings = SettingsStore::new(store);
    assert_eq!(settings.list_enabled_labels(), AppSettings::default_enabled_topics());

    settings
        .storage()
        .set(SETTINGS_STORAGE_KEY, r#"{"enabledTopics": "UK", "lastUpdated": "yesterday"}"#)
        .unwrap();
    assert_eq!(settings.list_enabled_labels(), AppSettings::default_enabled_topics());

    settings
        .storage()
        .set(SETTINGS_STORAGE_KEY, r#"{"enabledTopics": []}"#)
        .unwrap();
    assert!(settings.list_enabled_labels().is_empty());
}

#[test]
fn test_broken_storage_is_not_fatal() {
    let settings = SettingsStore::new(BrokenStore);

    let mut current = settings.load();
    assert_eq!(current.enabled_topics, AppSettings::default_enabled_topics());

    settings.save(&mut current);
    settings.set_topic_enabled("UK", false);

    // The failed write is dropped, so defaults still apply
    assert!(settings.list_enabled_labels().iter().any(|t| t == "UK"));
}

#[test]
fn test_file_store_persists_between_handles() {
    let dir = tempfile::tempdir().unwrap();

    let first = SettingsStore::new(FileStore::new(dir.path()));
    first.set_topic_enabled("Technology", false);
    first.set_topic_enabled("Sport", true);

    let second = SettingsStore::new(FileStore::new(dir.path()));
    let labels = second.list_enabled_labels();
    assert!(labels.iter().any(|t| t == "Sport"));
    assert!(!labels.iter().any(|t| t == "Technology"));

    second.reset();
    assert_eq!(first.list_enabled_labels(), AppSettings::default_enabled_topics());
}

#[test]
fn test_unknown_stored_labels_do_not_block_repair() {
    let store = MemoryStore::new();
    store
        .set(
            SETTINGS_STORAGE_KEY,
            r#"{"enabledTopics": ["Finland"], "lastUpdated": "2024-05-01T09:30:00Z"}"#,
        )
        .unwrap();
    let settings = SettingsStore::new(store);

    assert!(settings.list_enabled_labels().is_empty());
    assert!(!settings.has_enabled_topics());

    assert!(!settings.update_topic("Finland", false));
    assert_eq!(settings.list_enabled_labels(), vec!["UK", "World"]);
}

#[test]
fn test_unknown_stored_labels_are_dropped_beside_known_ones() {
    let store = MemoryStore::new();
    store
        .set(SETTINGS_STORAGE_KEY, r#"{"enabledTopics": ["Finland", "Sport"]}"#)
        .unwrap();
    let settings = SettingsStore::new(store);

    assert_eq!(settings.list_enabled_labels(), vec!["Sport"]);
    assert!(settings.set_topic_enabled("Sport", false));
    assert!(settings.ensure_minimum_enabled());
    assert_eq!(settings.list_enabled_labels(), MINIMUM_TOPICS.to_vec());
}

#[test]
fn test_reset_removes_stored_record() {
    let settings = SettingsStore::new(MemoryStore::new());
    settings.set_topic_enabled("Climate", true);
    assert!(settings.storage().get(SETTINGS_STORAGE_KEY).unwrap().is_some());

    settings.reset();
    assert_eq!(settings.storage().get(SETTINGS_STORAGE_KEY).unwrap(), None);
    assert_eq!(settings.list_enabled_labels(), AppSettings::default_enabled_topics());
}

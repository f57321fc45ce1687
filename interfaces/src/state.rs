use anyhow::Result;

// Named-record store that user settings persist through.
// Implementations must be usable from any task; keys are plain identifiers.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

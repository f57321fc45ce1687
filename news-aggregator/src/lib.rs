pub mod types;
pub mod fetcher;
pub mod parser;
pub mod normalizer;
pub mod traits;
pub mod sources;
pub mod state;
pub mod settings;
pub mod aggregator;

pub use types::*;
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use traits::{NewsSource, SourceKind};
pub use state::{FileStore, MemoryStore};
pub use settings::SettingsStore;
pub use aggregator::NewsAggregator;

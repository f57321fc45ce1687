pub mod defs;
pub mod state;

pub use defs::{AppSettings, Article, ArticleSource, Topic, TopicSetting, PLACEHOLDER_URL};
pub use state::KeyValueStore;

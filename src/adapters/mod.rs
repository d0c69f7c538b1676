//! Source adapters
//!
//! Each export source stores its secondary detail in a different field. An
//! adapter knows which one; the [`AdapterRegistry`] maps a source tag to its
//! adapter and falls back to the record header for unregistered sources.

mod chrome;
mod maps;
mod youtube;

pub use chrome::ChromeAdapter;
pub use maps::MapsAdapter;
pub use youtube::YouTubeAdapter;

use crate::schema::RawRecord;
use crate::types::Source;
use std::collections::HashMap;

/// Trait for per-source field extraction
pub trait SourceAdapter: Send + Sync {
    /// Source this adapter handles
    fn source(&self) -> Source;

    /// Derive the `extra` column from a raw record
    fn extra(&self, record: &RawRecord) -> String;
}

/// Dispatch table from source tag to adapter
pub struct AdapterRegistry {
    adapters: HashMap<Source, Box<dyn SourceAdapter>>,
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

impl AdapterRegistry {
    /// Empty registry; every source falls back to the header
    pub fn empty() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// Registry with the Chrome, YouTube and Maps adapters
    pub fn with_defaults() -> Self {
        let mut registry = Self::empty();
        registry.register(Box::new(ChromeAdapter));
        registry.register(Box::new(YouTubeAdapter));
        registry.register(Box::new(MapsAdapter));
        registry
    }

    /// Add or replace the adapter for its source
    pub fn register(&mut self, adapter: Box<dyn SourceAdapter>) {
        self.adapters.insert(adapter.source(), adapter);
    }

    pub fn contains(&self, source: &Source) -> bool {
        self.adapters.contains_key(source)
    }

    /// `extra` for a record of the given source
    pub fn extra_for(&self, source: &Source, record: &RawRecord) -> String {
        match self.adapters.get(source) {
            Some(adapter) => adapter.extra(record),
            None => record.header(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(json: &str) -> RawRecord {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_default_dispatch() {
        let registry = AdapterRegistry::with_defaults();
        let raw = record(
            r#"{"header": "Z", "description": "Y", "subtitles": [{"name": "X"}]}"#,
        );

        assert_eq!(registry.extra_for(&Source::YouTube, &raw), "X");
        assert_eq!(registry.extra_for(&Source::Maps, &raw), "Y");
        assert_eq!(registry.extra_for(&Source::Chrome, &raw), "Z");
        assert_eq!(
            registry.extra_for(&Source::Other("Search".to_string()), &raw),
            "Z"
        );
    }

    struct TitleAdapter;

    impl SourceAdapter for TitleAdapter {
        fn source(&self) -> Source {
            Source::Other("Play".to_string())
        }

        fn extra(&self, record: &RawRecord) -> String {
            record.title()
        }
    }

    #[test]
    fn test_register_custom_source() {
        let mut registry = AdapterRegistry::with_defaults();
        let play = Source::Other("Play".to_string());
        assert!(!registry.contains(&play));

        registry.register(Box::new(TitleAdapter));
        assert!(registry.contains(&play));

        let raw = record(r#"{"header": "Google Play", "title": "Used Maps"}"#);
        assert_eq!(registry.extra_for(&play, &raw), "Used Maps");
    }

    #[test]
    fn test_empty_registry_falls_back_to_header() {
        let registry = AdapterRegistry::empty();
        let raw = record(r#"{"header": "YouTube", "subtitles": [{"name": "X"}]}"#);
        assert_eq!(registry.extra_for(&Source::YouTube, &raw), "YouTube");
    }
}

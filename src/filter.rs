//! Table filters
//!
//! Filters never touch the canonical table; they return a new view.

use crate::aggregator::ActivityTable;
use crate::types::{ActivityEvent, Source};
use serde::{Deserialize, Serialize};

/// Source and keyword selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventFilter {
    /// Sources to keep; empty keeps every source
    #[serde(default)]
    pub sources: Vec<Source>,
    /// Case-insensitive substring to look for in the title
    #[serde(default)]
    pub keyword: Option<String>,
}

impl EventFilter {
    pub fn new(sources: Vec<Source>, keyword: Option<String>) -> Self {
        let keyword = keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        Self { sources, keyword }
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty() && self.keyword.is_none()
    }

    pub fn matches(&self, event: &ActivityEvent) -> bool {
        let source_ok = self.sources.is_empty() || self.sources.contains(&event.source);
        let keyword_ok = match &self.keyword {
            Some(keyword) => event
                .title
                .to_lowercase()
                .contains(&keyword.to_lowercase()),
            None => true,
        };
        source_ok && keyword_ok
    }
}

/// Filtered copy of `table`
pub fn apply_filters(table: &ActivityTable, filter: &EventFilter) -> ActivityTable {
    if filter.is_empty() {
        return table.clone();
    }
    ActivityTable::new(
        table
            .iter()
            .filter(|event| filter.matches(event))
            .cloned()
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::ActivityAggregator;
    use crate::loader::SourceLoader;
    use crate::schema::InputFormat;

    fn sample_table() -> ActivityTable {
        let loader = SourceLoader::default();
        let chrome = loader
            .load_str(
                r#"[
                    {"title": "Visited Rust docs", "time": "2024-01-01T10:00:00Z"},
                    {"title": "Visited news", "time": "2024-01-01T11:00:00Z"}
                ]"#,
                InputFormat::Json,
                &Source::Chrome,
            )
            .unwrap();
        let youtube = loader
            .load_str(
                r#"[{"title": "Watched RUST talk", "time": "2024-01-02T20:00:00Z"}]"#,
                InputFormat::Json,
                &Source::YouTube,
            )
            .unwrap();
        ActivityAggregator::merge(vec![chrome, youtube])
    }

    #[test]
    fn test_keyword_is_case_insensitive() {
        let table = sample_table();
        let filtered = apply_filters(&table, &EventFilter::new(vec![], Some("rust".to_string())));
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_source_filter() {
        let table = sample_table();
        let filtered = apply_filters(&table, &EventFilter::new(vec![Source::YouTube], None));
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.events()[0].source, Source::YouTube);
    }

    #[test]
    fn test_combined_filters_leave_original_untouched() {
        let table = sample_table();
        let filter = EventFilter::new(vec![Source::Chrome], Some("RUST".to_string()));
        let filtered = apply_filters(&table, &filter);

        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered.events()[0].title, "Visited Rust docs");
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_blank_keyword_is_ignored() {
        let filter = EventFilter::new(vec![], Some("   ".to_string()));
        assert!(filter.is_empty());
        assert_eq!(apply_filters(&sample_table(), &filter).len(), 3);
    }
}

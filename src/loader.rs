//! Source loading
//!
//! Loads one source's collection: parse, normalize every record, parse its
//! timestamp, drop records whose timestamp fails, derive calendar fields.
//! A dropped record is a data-quality filter, not an error; a collection that
//! cannot be parsed at all is reported as a malformed source.

use crate::error::PipelineError;
use crate::normalizer::RecordNormalizer;
use crate::schema::{InputFormat, RawRecord, RawRecordAdapter};
use crate::timestamp::parse_timestamp;
use crate::types::{ActivityEvent, Source, SourceSummary};
use chrono_tz::Tz;
use tracing::{debug, warn};

/// Events loaded from one source
#[derive(Debug, Clone, PartialEq)]
pub struct SourceTable {
    pub source: Source,
    pub events: Vec<ActivityEvent>,
    /// Records present in the collection
    pub total_records: usize,
    /// Records dropped for unparseable timestamps
    pub dropped: usize,
}

impl SourceTable {
    pub fn summary(&self) -> SourceSummary {
        SourceSummary {
            source: self.source.clone(),
            total_records: self.total_records,
            kept: self.events.len(),
            dropped: self.dropped,
            error: None,
        }
    }
}

/// Loader for a single source collection
pub struct SourceLoader {
    normalizer: RecordNormalizer,
    timezone: Tz,
}

impl Default for SourceLoader {
    fn default() -> Self {
        Self::new(RecordNormalizer::default(), chrono_tz::UTC)
    }
}

impl SourceLoader {
    /// Create a loader deriving calendar fields in `timezone`
    pub fn new(normalizer: RecordNormalizer, timezone: Tz) -> Self {
        Self {
            normalizer,
            timezone,
        }
    }

    pub fn timezone(&self) -> Tz {
        self.timezone
    }

    /// Parse and load a raw collection
    pub fn load_str(
        &self,
        raw: &str,
        format: InputFormat,
        source: &Source,
    ) -> Result<SourceTable, PipelineError> {
        let records = RawRecordAdapter::parse(raw, format, source)?;
        Ok(self.load_records(&records, source))
    }

    /// Load already-parsed records. Never fails: records without a parseable
    /// timestamp are dropped and counted.
    pub fn load_records(&self, records: &[RawRecord], source: &Source) -> SourceTable {
        let mut events = Vec::with_capacity(records.len());
        let mut dropped = 0;

        for record in records {
            let normalized = self.normalizer.normalize(record, source);
            let parsed = match normalized.time.as_deref() {
                Some(raw) => parse_timestamp(raw),
                None => Err(PipelineError::UnparseableTimestamp(String::new())),
            };

            match parsed {
                Ok(timestamp) => {
                    events.push(ActivityEvent::from_normalized(
                        normalized,
                        timestamp,
                        self.timezone,
                    ));
                }
                Err(_) => dropped += 1,
            }
        }

        if dropped > 0 {
            warn!(
                source = %source,
                total = records.len(),
                dropped,
                "dropped records with unparseable timestamps"
            );
        } else {
            debug!(source = %source, total = records.len(), "source loaded");
        }

        SourceTable {
            source: source.clone(),
            events,
            total_records: records.len(),
            dropped,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn sample_chrome_json() -> &'static str {
        r#"[
            {"header": "Chrome", "title": "Visited docs.rs", "titleUrl": "https://docs.rs", "time": "2024-01-15T08:30:00.000Z"},
            {"header": "Chrome", "title": "Visited crates.io", "time": "2024-01-15 21:05:00"},
            {"header": "Chrome", "title": "Broken", "time": "not a time"},
            {"header": "Chrome", "title": "No time at all"},
            {"header": "Chrome", "title": "Numeric time", "time": 1705307400}
        ]"#
    }

    #[test]
    fn test_drops_unparseable_timestamps() {
        let table = SourceLoader::default()
            .load_str(sample_chrome_json(), InputFormat::Json, &Source::Chrome)
            .unwrap();

        assert_eq!(table.total_records, 5);
        assert_eq!(table.events.len(), 2);
        assert_eq!(table.dropped, 3);
        assert_eq!(table.total_records - table.dropped, table.events.len());
    }

    #[test]
    fn test_calendar_fields_match_timestamp() {
        let table = SourceLoader::default()
            .load_str(sample_chrome_json(), InputFormat::Json, &Source::Chrome)
            .unwrap();

        let first = &table.events[0];
        assert_eq!(first.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(first.hour, 8);
        assert_eq!(first.weekday, "Monday");
        assert_eq!(first.url, "https://docs.rs");
        assert_eq!(first.extra, "Chrome");

        let second = &table.events[1];
        assert_eq!(second.hour, 21);
    }

    #[test]
    fn test_timezone_shifts_calendar_fields() {
        let loader = SourceLoader::new(RecordNormalizer::default(), chrono_tz::America::New_York);
        let table = loader
            .load_str(
                r#"[{"title": "late", "time": "2024-01-16T02:00:00Z"}]"#,
                InputFormat::Json,
                &Source::Maps,
            )
            .unwrap();

        let event = &table.events[0];
        assert_eq!(event.date, NaiveDate::from_ymd_opt(2024, 1, 15).unwrap());
        assert_eq!(event.hour, 21);
    }

    #[test]
    fn test_malformed_collection_is_an_error() {
        let result =
            SourceLoader::default().load_str("[{\"title\": ", InputFormat::Json, &Source::Maps);
        assert!(matches!(
            result,
            Err(PipelineError::MalformedSource { .. })
        ));
    }

    #[test]
    fn test_empty_collection() {
        let table = SourceLoader::default()
            .load_str("[]", InputFormat::Json, &Source::YouTube)
            .unwrap();
        assert!(table.events.is_empty());
        assert_eq!(table.summary().kept, 0);
    }
}

//! Core types for the Life in Data pipeline
//!
//! This module defines the data structures that flow through each stage of the
//! pipeline: normalized records, activity events, daily aggregates, the
//! classifier feature vector, and the insight/report types built on top.

use chrono::{DateTime, Datelike, NaiveDate, Timelike, Utc, Weekday};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weekday names in Monday-first order. Index equals `weekday_index`.
pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Origin system of an activity record
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Source {
    Chrome,
    YouTube,
    Maps,
    /// For exports from other Takeout products
    #[serde(untagged)]
    Other(String),
}

impl Source {
    pub fn as_str(&self) -> &str {
        match self {
            Source::Chrome => "Chrome",
            Source::YouTube => "YouTube",
            Source::Maps => "Maps",
            Source::Other(name) => name.as_str(),
        }
    }

    /// Resolve a user-supplied source name (case-insensitive)
    pub fn from_name(name: &str) -> Source {
        match name.trim().to_ascii_lowercase().as_str() {
            "chrome" => Source::Chrome,
            "youtube" => Source::YouTube,
            "maps" | "google maps" => Source::Maps,
            _ => Source::Other(name.trim().to_string()),
        }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A raw record after field defaults and `extra` extraction, before its
/// timestamp has been parsed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    /// Raw timestamp text, if the record carried one as a string
    pub time: Option<String>,
    pub title: String,
    pub url: String,
    pub source: Source,
    pub extra: String,
    pub header: String,
}

/// One normalized activity event with its calendar fields derived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityEvent {
    /// Event time (UTC)
    pub timestamp: DateTime<Utc>,
    pub title: String,
    pub url: String,
    pub source: Source,
    /// Source-dependent secondary field (channel, description or header)
    pub extra: String,
    pub header: String,
    /// Calendar date in the display timezone
    pub date: NaiveDate,
    /// Hour of day (0-23) in the display timezone
    pub hour: u32,
    /// Weekday name (Monday..Sunday)
    pub weekday: String,
}

impl ActivityEvent {
    /// Build an event from a normalized record and its parsed timestamp.
    /// Calendar fields are derived in `timezone`.
    pub fn from_normalized(record: NormalizedRecord, timestamp: DateTime<Utc>, timezone: Tz) -> Self {
        let local = timestamp.with_timezone(&timezone);
        let date = local.date_naive();

        Self {
            timestamp,
            title: record.title,
            url: record.url,
            source: record.source,
            extra: record.extra,
            header: record.header,
            date,
            hour: local.hour(),
            weekday: weekday_name(date.weekday()).to_string(),
        }
    }

    /// Monday = 0 .. Sunday = 6
    pub fn weekday_index(&self) -> u8 {
        weekday_index(self.date)
    }
}

/// Monday = 0 .. Sunday = 6
pub fn weekday_index(date: NaiveDate) -> u8 {
    date.weekday().num_days_from_monday() as u8
}

pub fn weekday_name(weekday: Weekday) -> &'static str {
    WEEKDAY_NAMES[weekday.num_days_from_monday() as usize]
}

/// Event count for one (date, source) pair. Rows only exist for counts >= 1.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub source: Source,
    pub activity_count: u32,
}

/// One row of the source-collapsed daily series
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyActivityRow {
    pub date: NaiveDate,
    /// Monday = 0 .. Sunday = 6
    pub weekday_index: u8,
    pub activity_count: u32,
    /// Count of the preceding row (absent for the first row)
    pub prev_day: Option<u32>,
    /// Count two rows back (absent for the first two rows)
    pub prev_2day: Option<u32>,
}

/// Input vector for the next-day classifier.
///
/// Field names and order are a fixed contract with the trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureVector {
    /// Weekday of the predicted day (Monday = 0)
    pub weekday: u8,
    pub prev_day: u32,
    pub prev_2day: u32,
}

impl FeatureVector {
    /// Feature names in the order the classifier consumes them
    pub const FIELD_NAMES: [&'static str; 3] = ["weekday", "prev_day", "prev_2day"];

    pub fn as_array(&self) -> [f64; 3] {
        [
            f64::from(self.weekday),
            f64::from(self.prev_day),
            f64::from(self.prev_2day),
        ]
    }
}

/// Classifier verdict for the next day
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Prediction {
    pub is_active_tomorrow: bool,
    /// Probability of the active class, whatever the predicted label
    pub confidence: f64,
}

/// Result of the prediction stage, which degrades instead of failing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionOutcome {
    Available {
        features: FeatureVector,
        prediction: Prediction,
    },
    Unavailable {
        code: String,
        reason: String,
    },
}

impl PredictionOutcome {
    pub fn prediction(&self) -> Option<&Prediction> {
        match self {
            PredictionOutcome::Available { prediction, .. } => Some(prediction),
            PredictionOutcome::Unavailable { .. } => None,
        }
    }
}

/// Calendar insights over the (possibly filtered) event table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insights {
    /// Longest run of consecutive active dates
    pub longest_streak: u32,
    /// Dates inside the observed range with zero activity
    pub detox_days: u32,
    /// Most frequent per-day modal hour
    pub most_consistent_hour: Option<u32>,
}

/// Headline numbers shown above the charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Highlights {
    pub total_activities: usize,
    pub most_active_weekday: Option<String>,
    pub most_used_source: Option<Source>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: Source,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCount {
    pub weekday: String,
    pub count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCount {
    pub date: NaiveDate,
    pub count: u32,
}

/// Counts behind the platform, hourly, weekday and timeline charts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Breakdowns {
    pub by_source: Vec<SourceCount>,
    /// 24 entries, index = hour
    pub by_hour: Vec<u32>,
    /// 7 entries, Monday first
    pub by_weekday: Vec<WeekdayCount>,
    pub by_date: Vec<DateCount>,
}

/// Load summary for one source
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSummary {
    pub source: Source,
    pub total_records: usize,
    pub kept: usize,
    /// Records dropped for unparseable timestamps
    pub dropped: usize,
    /// Set when the whole source failed to load
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Report producer metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Filters applied to the insight and breakdown sections of a report
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSummary {
    pub sources: Vec<Source>,
    pub keyword: Option<String>,
    pub matched_events: usize,
}

/// Complete report consumed by the presentation layer
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivityReport {
    pub report_version: String,
    pub producer: ReportProducer,
    pub computed_at_utc: String,
    pub timezone: String,
    pub sources: Vec<SourceSummary>,
    pub highlights: Highlights,
    pub filter: FilterSummary,
    pub insights: Insights,
    pub breakdowns: Breakdowns,
    pub daily_aggregate: Vec<DailyAggregate>,
    pub daily_series: Vec<DailyActivityRow>,
    pub prediction: PredictionOutcome,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub events: Option<Vec<ActivityEvent>>,
}

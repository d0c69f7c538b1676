//! Activity aggregation
//!
//! Merges per-source tables into one event table and groups it into:
//! - per (date, source) counts
//! - a source-collapsed daily series with `prev_day` / `prev_2day` lags

use crate::error::PipelineError;
use crate::loader::SourceTable;
use crate::types::{weekday_index, ActivityEvent, DailyActivityRow, DailyAggregate, Source};
use chrono::NaiveDate;
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

/// The merged event table shared by insights, breakdowns and export
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ActivityTable {
    events: Vec<ActivityEvent>,
}

impl ActivityTable {
    pub fn new(events: Vec<ActivityEvent>) -> Self {
        Self { events }
    }

    pub fn events(&self) -> &[ActivityEvent] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActivityEvent> {
        self.events.iter()
    }

    /// Distinct dates with at least one event, ascending
    pub fn active_dates(&self) -> Vec<NaiveDate> {
        self.events
            .iter()
            .map(|e| e.date)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Distinct sources present, in source order
    pub fn sources(&self) -> Vec<Source> {
        self.events
            .iter()
            .map(|e| e.source.clone())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Daily counts collapsed across sources, ascending by date
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DailyActivitySeries {
    rows: Vec<DailyActivityRow>,
}

impl DailyActivitySeries {
    /// Build the series from per-date counts. Lags are taken from the
    /// preceding rows, not the preceding calendar days.
    pub fn from_daily_counts(counts: &BTreeMap<NaiveDate, u32>) -> Self {
        let mut series = Self {
            rows: Vec::with_capacity(counts.len()),
        };
        for (&date, &activity_count) in counts {
            series.push(date, weekday_index(date), activity_count);
        }
        series
    }

    /// Load a pre-computed daily snapshot (JSON array of
    /// `{ "date", "weekday"?, "activity_count" }`).
    ///
    /// When `weekday` is present it is trusted over the date, since the
    /// snapshot comes from the training process.
    pub fn from_snapshot_json(json: &str) -> Result<Self, PipelineError> {
        let rows: Vec<SnapshotRow> = serde_json::from_str(json)
            .map_err(|e| PipelineError::ModelUnavailable(format!("invalid history snapshot: {e}")))?;

        let mut sorted = rows;
        sorted.sort_by_key(|r| r.date);

        let mut series = Self::default();
        for row in sorted {
            let weekday = match row.weekday {
                Some(w) if w <= 6 => w,
                Some(w) => {
                    return Err(PipelineError::ModelUnavailable(format!(
                        "history snapshot weekday {w} outside 0-6"
                    )))
                }
                None => weekday_index(row.date),
            };
            series.push(row.date, weekday, row.activity_count);
        }
        Ok(series)
    }

    fn push(&mut self, date: NaiveDate, weekday_index: u8, activity_count: u32) {
        let n = self.rows.len();
        let prev_day = n.checked_sub(1).map(|i| self.rows[i].activity_count);
        let prev_2day = n.checked_sub(2).map(|i| self.rows[i].activity_count);
        self.rows.push(DailyActivityRow {
            date,
            weekday_index,
            activity_count,
            prev_day,
            prev_2day,
        });
    }

    pub fn rows(&self) -> &[DailyActivityRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn last(&self) -> Option<&DailyActivityRow> {
        self.rows.last()
    }
}

#[derive(Debug, Deserialize)]
struct SnapshotRow {
    date: NaiveDate,
    #[serde(default)]
    weekday: Option<u8>,
    activity_count: u32,
}

/// Aggregator for merged activity
pub struct ActivityAggregator;

impl ActivityAggregator {
    /// Concatenate per-source tables in the given order
    pub fn merge(tables: Vec<SourceTable>) -> ActivityTable {
        let events = tables.into_iter().flat_map(|t| t.events).collect();
        ActivityTable::new(events)
    }

    /// Count events per (date, source), ordered by date then source
    pub fn daily_by_source(table: &ActivityTable) -> Vec<DailyAggregate> {
        let mut counts: BTreeMap<(NaiveDate, Source), u32> = BTreeMap::new();
        for event in table.iter() {
            *counts.entry((event.date, event.source.clone())).or_insert(0) += 1;
        }

        counts
            .into_iter()
            .map(|((date, source), activity_count)| DailyAggregate {
                date,
                source,
                activity_count,
            })
            .collect()
    }

    /// Collapse across sources into the lagged daily series
    pub fn daily_series(table: &ActivityTable) -> DailyActivitySeries {
        let mut counts: BTreeMap<NaiveDate, u32> = BTreeMap::new();
        for event in table.iter() {
            *counts.entry(event.date).or_insert(0) += 1;
        }
        DailyActivitySeries::from_daily_counts(&counts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceLoader;
    use crate::schema::InputFormat;

    fn date(m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, m, d).unwrap()
    }

    fn load(json: &str, source: Source) -> SourceTable {
        SourceLoader::default()
            .load_str(json, InputFormat::Json, &source)
            .unwrap()
    }

    fn sample_tables() -> Vec<SourceTable> {
        vec![
            load(
                r#"[
                    {"title": "a", "time": "2024-01-01T08:00:00Z"},
                    {"title": "b", "time": "2024-01-01T09:00:00Z"},
                    {"title": "c", "time": "2024-01-03T10:00:00Z"}
                ]"#,
                Source::Chrome,
            ),
            load(
                r#"[
                    {"title": "d", "time": "2024-01-01T20:00:00Z"},
                    {"title": "e", "time": "2024-01-02T20:00:00Z"}
                ]"#,
                Source::YouTube,
            ),
            load("[]", Source::Maps),
        ]
    }

    #[test]
    fn test_merge_is_concatenation() {
        let table = ActivityAggregator::merge(sample_tables());
        assert_eq!(table.len(), 5);
        assert_eq!(table.sources(), vec![Source::Chrome, Source::YouTube]);
        assert_eq!(table.active_dates(), vec![date(1, 1), date(1, 2), date(1, 3)]);
    }

    #[test]
    fn test_daily_by_source_counts() {
        let table = ActivityAggregator::merge(sample_tables());
        let daily = ActivityAggregator::daily_by_source(&table);

        assert_eq!(
            daily,
            vec![
                DailyAggregate { date: date(1, 1), source: Source::Chrome, activity_count: 2 },
                DailyAggregate { date: date(1, 1), source: Source::YouTube, activity_count: 1 },
                DailyAggregate { date: date(1, 2), source: Source::YouTube, activity_count: 1 },
                DailyAggregate { date: date(1, 3), source: Source::Chrome, activity_count: 1 },
            ]
        );
        let total: u32 = daily.iter().map(|r| r.activity_count).sum();
        assert_eq!(total as usize, table.len());
        assert!(daily.iter().all(|r| r.activity_count >= 1));
    }

    #[test]
    fn test_daily_series_lags() {
        let table = ActivityAggregator::merge(sample_tables());
        let series = ActivityAggregator::daily_series(&table);
        let rows = series.rows();

        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].activity_count, 3);
        assert_eq!(rows[0].weekday_index, 0); // 2024-01-01 is a Monday
        assert_eq!(rows[0].prev_day, None);
        assert_eq!(rows[0].prev_2day, None);

        assert_eq!(rows[1].prev_day, Some(3));
        assert_eq!(rows[1].prev_2day, None);

        assert_eq!(rows[2].activity_count, 1);
        assert_eq!(rows[2].prev_day, Some(1));
        assert_eq!(rows[2].prev_2day, Some(3));
    }

    #[test]
    fn test_lags_follow_rows_not_calendar_gaps() {
        let mut counts = BTreeMap::new();
        counts.insert(date(1, 1), 4);
        counts.insert(date(1, 10), 2);
        let series = DailyActivitySeries::from_daily_counts(&counts);
        assert_eq!(series.rows()[1].prev_day, Some(4));
    }

    #[test]
    fn test_snapshot_json() {
        let json = r#"[
            {"date": "2024-02-04", "weekday": 6, "activity_count": 7},
            {"date": "2024-02-03", "weekday": 5, "activity_count": 10}
        ]"#;
        let series = DailyActivitySeries::from_snapshot_json(json).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.rows()[0].activity_count, 10);
        assert_eq!(series.last().unwrap().prev_day, Some(10));
    }

    #[test]
    fn test_snapshot_weekday_from_date() {
        let json = r#"[{"date": "2024-02-05", "activity_count": 1}]"#;
        let series = DailyActivitySeries::from_snapshot_json(json).unwrap();
        assert_eq!(series.rows()[0].weekday_index, 0);
    }

    #[test]
    fn test_snapshot_rejects_bad_weekday() {
        let json = r#"[{"date": "2024-02-05", "weekday": 7, "activity_count": 1}]"#;
        assert!(matches!(
            DailyActivitySeries::from_snapshot_json(json),
            Err(PipelineError::ModelUnavailable(_))
        ));
    }

    #[test]
    fn test_empty_table() {
        let table = ActivityTable::default();
        assert!(ActivityAggregator::daily_by_source(&table).is_empty());
        assert!(ActivityAggregator::daily_series(&table).is_empty());
    }
}

//! Insight calculators
//!
//! Pure functions over an event table:
//! - longest streak of consecutive active dates
//! - detox days (inactive dates inside the observed range)
//! - most consistent hour (mode of the per-date modal hours)
//! - highlights and chart breakdowns
//!
//! Every mode in this module breaks ties toward the smallest key (earliest
//! hour, Monday-first weekday, source declaration order).

use crate::aggregator::ActivityTable;
use crate::types::{
    Breakdowns, DateCount, Highlights, Insights, Source, SourceCount, WeekdayCount, WEEKDAY_NAMES,
};
use chrono::NaiveDate;
use std::collections::BTreeMap;

/// Compute all three calendar insights
pub fn compute_insights(table: &ActivityTable) -> Insights {
    let dates = table.active_dates();
    Insights {
        longest_streak: longest_streak(&dates),
        detox_days: detox_days(&dates),
        most_consistent_hour: most_consistent_hour(table),
    }
}

/// Longest run of calendar-consecutive dates.
///
/// Input need not be sorted or distinct. No dates gives 0.
pub fn longest_streak(dates: &[NaiveDate]) -> u32 {
    let mut sorted = dates.to_vec();
    sorted.sort_unstable();
    sorted.dedup();

    let Some(first) = sorted.first() else {
        return 0;
    };

    let mut best = 1;
    let mut current = 1;
    let mut previous = *first;
    for &date in &sorted[1..] {
        if (date - previous).num_days() == 1 {
            current += 1;
            best = best.max(current);
        } else {
            current = 1;
        }
        previous = date;
    }
    best
}

/// Dates within `[min, max]` inclusive that have no activity
pub fn detox_days(dates: &[NaiveDate]) -> u32 {
    let (Some(min), Some(max)) = (dates.iter().min(), dates.iter().max()) else {
        return 0;
    };

    let mut distinct = dates.to_vec();
    distinct.sort_unstable();
    distinct.dedup();

    let span = (*max - *min).num_days() + 1;
    (span - distinct.len() as i64).max(0) as u32
}

/// Mode of the per-date modal hours
pub fn most_consistent_hour(table: &ActivityTable) -> Option<u32> {
    let mut hours_by_date: BTreeMap<NaiveDate, BTreeMap<u32, u32>> = BTreeMap::new();
    for event in table.iter() {
        *hours_by_date
            .entry(event.date)
            .or_default()
            .entry(event.hour)
            .or_insert(0) += 1;
    }

    let mut modal_hour_counts: BTreeMap<u32, u32> = BTreeMap::new();
    for hour_counts in hours_by_date.values() {
        if let Some(hour) = mode(hour_counts) {
            *modal_hour_counts.entry(hour).or_insert(0) += 1;
        }
    }

    mode(&modal_hour_counts)
}

/// Key with the highest count; ties go to the smallest key
fn mode<K: Ord + Clone>(counts: &BTreeMap<K, u32>) -> Option<K> {
    let mut best: Option<(&K, u32)> = None;
    for (key, &count) in counts {
        match best {
            Some((_, best_count)) if count <= best_count => {}
            _ => best = Some((key, count)),
        }
    }
    best.map(|(key, _)| key.clone())
}

/// Headline numbers: total, busiest weekday, most used source
pub fn highlights(table: &ActivityTable) -> Highlights {
    let mut weekday_counts: BTreeMap<u8, u32> = BTreeMap::new();
    let mut source_counts: BTreeMap<Source, u32> = BTreeMap::new();
    for event in table.iter() {
        *weekday_counts.entry(event.weekday_index()).or_insert(0) += 1;
        *source_counts.entry(event.source.clone()).or_insert(0) += 1;
    }

    Highlights {
        total_activities: table.len(),
        most_active_weekday: mode(&weekday_counts)
            .map(|idx| WEEKDAY_NAMES[usize::from(idx)].to_string()),
        most_used_source: mode(&source_counts),
    }
}

/// Counts per source, hour, weekday and date
pub fn breakdowns(table: &ActivityTable) -> Breakdowns {
    let mut by_source: BTreeMap<Source, u32> = BTreeMap::new();
    let mut by_hour = vec![0u32; 24];
    let mut by_weekday = [0u32; 7];
    let mut by_date: BTreeMap<NaiveDate, u32> = BTreeMap::new();

    for event in table.iter() {
        *by_source.entry(event.source.clone()).or_insert(0) += 1;
        if let Some(slot) = by_hour.get_mut(event.hour as usize) {
            *slot += 1;
        }
        by_weekday[usize::from(event.weekday_index())] += 1;
        *by_date.entry(event.date).or_insert(0) += 1;
    }

    Breakdowns {
        by_source: by_source
            .into_iter()
            .map(|(source, count)| SourceCount { source, count })
            .collect(),
        by_hour,
        by_weekday: WEEKDAY_NAMES
            .iter()
            .zip(by_weekday)
            .map(|(name, count)| WeekdayCount {
                weekday: name.to_string(),
                count,
            })
            .collect(),
        by_date: by_date
            .into_iter()
            .map(|(date, count)| DateCount { date, count })
            .collect(),
    }
}

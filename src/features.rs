//! Next-day feature construction
//!
//! Builds the classifier input for the day after the last row of a daily
//! series: the next weekday (wrapping Sunday to Monday) and the counts of the
//! last two rows.

use crate::aggregator::DailyActivitySeries;
use crate::error::PipelineError;
use crate::types::FeatureVector;

/// Builder for the fixed three-field feature vector
pub struct FeatureBuilder;

impl FeatureBuilder {
    /// Feature vector for the unseen day following `series`
    pub fn next_day(series: &DailyActivitySeries) -> Result<FeatureVector, PipelineError> {
        let rows = series.rows();
        let [.., second_last, last] = rows else {
            return Err(PipelineError::InsufficientHistory { rows: rows.len() });
        };

        Ok(FeatureVector {
            weekday: (last.weekday_index + 1) % 7,
            prev_day: last.activity_count,
            prev_2day: second_last.activity_count,
        })
    }
}

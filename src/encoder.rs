//! Report encoding
//!
//! This module encodes a pipeline run into the JSON report consumed by the
//! presentation layer. Filters apply to highlights, insights and breakdowns;
//! the daily aggregates, series and prediction always describe the full run.

use crate::error::PipelineError;
use crate::filter::{apply_filters, EventFilter};
use crate::insights::{breakdowns, compute_insights, highlights};
use crate::pipeline::PipelineOutput;
use crate::types::{ActivityReport, FilterSummary, ReportProducer};
use crate::{LIFEDATA_VERSION, PRODUCER_NAME};
use chrono::Utc;
use uuid::Uuid;

/// Current report schema version
pub const REPORT_VERSION: &str = "1.0.0";

/// Encoder for activity reports
pub struct ReportEncoder {
    instance_id: String,
    include_events: bool,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
            include_events: false,
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self {
            instance_id,
            include_events: false,
        }
    }

    /// Embed the filtered event rows in the report
    pub fn include_events(mut self, include: bool) -> Self {
        self.include_events = include;
        self
    }

    /// Build the report for a finished run
    pub fn encode(&self, output: &PipelineOutput, filter: &EventFilter) -> ActivityReport {
        let filtered = apply_filters(&output.table, filter);

        let producer = ReportProducer {
            name: PRODUCER_NAME.to_string(),
            version: LIFEDATA_VERSION.to_string(),
            instance_id: self.instance_id.clone(),
        };

        let filter_summary = FilterSummary {
            sources: filter.sources.clone(),
            keyword: filter.keyword.clone(),
            matched_events: filtered.len(),
        };

        ActivityReport {
            report_version: REPORT_VERSION.to_string(),
            producer,
            computed_at_utc: Utc::now().to_rfc3339(),
            timezone: output.timezone.name().to_string(),
            sources: output.sources.clone(),
            highlights: highlights(&filtered),
            filter: filter_summary,
            insights: compute_insights(&filtered),
            breakdowns: breakdowns(&filtered),
            daily_aggregate: output.daily_aggregate.clone(),
            daily_series: output.daily_series.rows().to_vec(),
            prediction: output.prediction.clone(),
            events: self.include_events.then(|| filtered.events().to_vec()),
        }
    }

    /// Encode to compact JSON
    pub fn encode_to_json(
        &self,
        output: &PipelineOutput,
        filter: &EventFilter,
    ) -> Result<String, PipelineError> {
        let report = self.encode(output, filter);
        serde_json::to_string(&report).map_err(PipelineError::JsonError)
    }

    /// Encode to indented JSON
    pub fn encode_to_json_pretty(
        &self,
        output: &PipelineOutput,
        filter: &EventFilter,
    ) -> Result<String, PipelineError> {
        let report = self.encode(output, filter);
        serde_json::to_string_pretty(&report).map_err(PipelineError::JsonError)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::{ActivityPipeline, SourceInput};
    use crate::schema::InputFormat;
    use crate::types::Source;

    fn sample_output() -> PipelineOutput {
        let chrome = r#"[
            {"header": "Chrome", "title": "Visited Rust docs", "time": "2024-01-01T09:00:00Z"},
            {"header": "Chrome", "title": "Visited news", "time": "2024-01-02T09:00:00Z"}
        ]"#;
        let youtube = r#"[
            {"header": "YouTube", "title": "Watched Rust talk", "time": "2024-01-04T20:00:00Z"}
        ]"#;
        ActivityPipeline::new().run(vec![
            SourceInput::from_text(Source::Chrome, InputFormat::Json, chrome),
            SourceInput::from_text(Source::YouTube, InputFormat::Json, youtube),
        ])
    }

    #[test]
    fn test_encode_report() {
        let encoder = ReportEncoder::with_instance_id("test-instance".to_string());
        let report = encoder.encode(&sample_output(), &EventFilter::default());

        assert_eq!(report.report_version, REPORT_VERSION);
        assert_eq!(report.producer.name, PRODUCER_NAME);
        assert_eq!(report.producer.instance_id, "test-instance");
        assert_eq!(report.timezone, "UTC");
        assert_eq!(report.highlights.total_activities, 3);
        assert_eq!(report.insights.longest_streak, 2);
        assert_eq!(report.insights.detox_days, 1);
        assert_eq!(report.daily_series.len(), 3);
        assert!(report.events.is_none());
    }

    #[test]
    fn test_filter_scopes_insights_only() {
        let encoder = ReportEncoder::new().include_events(true);
        let filter = EventFilter::new(vec![], Some("rust".to_string()));
        let report = encoder.encode(&sample_output(), &filter);

        assert_eq!(report.filter.matched_events, 2);
        assert_eq!(report.highlights.total_activities, 2);
        assert_eq!(report.events.as_ref().map(Vec::len), Some(2));
        // Jan 1 and Jan 4 only
        assert_eq!(report.insights.longest_streak, 1);
        assert_eq!(report.insights.detox_days, 2);
        // Unfiltered sections
        assert_eq!(report.daily_series.len(), 3);
        let total: u32 = report.daily_aggregate.iter().map(|r| r.activity_count).sum();
        assert_eq!(total, 3);
    }

    #[test]
    fn test_json_round_trip() {
        let encoder = ReportEncoder::new();
        let json = encoder
            .encode_to_json_pretty(&sample_output(), &EventFilter::default())
            .unwrap();
        let parsed: ActivityReport = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.highlights.total_activities, 3);
        assert_eq!(parsed.breakdowns.by_hour.len(), 24);
    }
}

//! Pipeline orchestration
//!
//! This module provides the public API for Life in Data.
//! It runs every source through loading, merges and aggregates the result,
//! and attempts the next-day prediction.
//!
//! Failures are contained per stage: a malformed source is reported and the
//! other sources still load; a missing model or short history turns the
//! prediction into an "unavailable" outcome without touching the rest.

use crate::aggregator::{ActivityAggregator, ActivityTable, DailyActivitySeries};
use crate::encoder::ReportEncoder;
use crate::error::PipelineError;
use crate::features::FeatureBuilder;
use crate::filter::EventFilter;
use crate::loader::{SourceLoader, SourceTable};
use crate::normalizer::RecordNormalizer;
use crate::predictor::Predictor;
use crate::schema::InputFormat;
use crate::types::{DailyAggregate, PredictionOutcome, Source, SourceSummary};
use chrono_tz::Tz;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// One source's raw collection, or the reason it could not be read
#[derive(Debug)]
pub struct SourceInput {
    pub source: Source,
    pub format: InputFormat,
    pub payload: Result<String, PipelineError>,
}

impl SourceInput {
    pub fn from_text(source: Source, format: InputFormat, text: impl Into<String>) -> Self {
        Self {
            source,
            format,
            payload: Ok(text.into()),
        }
    }

    /// Read a collection from disk. A read failure is kept and reported for
    /// this source only.
    pub fn from_path(source: Source, format: InputFormat, path: &Path) -> Self {
        let payload = fs::read_to_string(path).map_err(|e| {
            PipelineError::malformed(
                source.as_str(),
                format!("cannot read {}: {e}", path.display()),
            )
        });
        Self {
            source,
            format,
            payload,
        }
    }
}

/// Everything the pipeline computes in one run
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub timezone: Tz,
    pub sources: Vec<SourceSummary>,
    /// Merged table of every successfully loaded source
    pub table: ActivityTable,
    pub daily_aggregate: Vec<DailyAggregate>,
    pub daily_series: DailyActivitySeries,
    pub prediction: PredictionOutcome,
}

impl PipelineOutput {
    /// Sources that failed to load
    pub fn failed_sources(&self) -> impl Iterator<Item = &SourceSummary> {
        self.sources.iter().filter(|s| s.error.is_some())
    }
}

/// Run the pipeline with default settings (UTC, no model) and return the
/// report as JSON.
///
/// # Example
/// ```ignore
/// let report = activity_report(vec![
///     SourceInput::from_text(Source::Chrome, InputFormat::Json, chrome_json),
///     SourceInput::from_text(Source::YouTube, InputFormat::Json, youtube_json),
/// ])?;
/// ```
pub fn activity_report(inputs: Vec<SourceInput>) -> Result<String, PipelineError> {
    let output = ActivityPipeline::new().run(inputs);
    ReportEncoder::new().encode_to_json(&output, &EventFilter::default())
}

/// Configurable pipeline.
///
/// The model and history snapshot are optional; when absent or broken the
/// prediction degrades instead of failing the run.
pub struct ActivityPipeline {
    loader: SourceLoader,
    predictor: Result<Predictor, PipelineError>,
    history: Option<Result<DailyActivitySeries, PipelineError>>,
}

impl Default for ActivityPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl ActivityPipeline {
    /// Pipeline with the default adapters, UTC calendar fields and no model
    pub fn new() -> Self {
        Self::with_loader(SourceLoader::default())
    }

    /// Pipeline deriving calendar fields in `timezone`
    pub fn with_timezone(timezone: Tz) -> Self {
        Self::with_loader(SourceLoader::new(RecordNormalizer::default(), timezone))
    }

    pub fn with_loader(loader: SourceLoader) -> Self {
        Self {
            loader,
            predictor: Err(PipelineError::ModelUnavailable(
                "no model artifact configured".to_string(),
            )),
            history: None,
        }
    }

    /// Attach a classifier, or the error from trying to load one
    pub fn with_predictor(mut self, predictor: Result<Predictor, PipelineError>) -> Self {
        self.predictor = predictor;
        self
    }

    /// Seed prediction from a pre-computed daily snapshot instead of the
    /// live series
    pub fn with_history(mut self, history: Result<DailyActivitySeries, PipelineError>) -> Self {
        self.history = Some(history);
        self
    }

    pub fn timezone(&self) -> Tz {
        self.loader.timezone()
    }

    /// Load one source
    pub fn load_source(&self, input: SourceInput) -> Result<SourceTable, PipelineError> {
        let raw = input.payload?;
        self.loader.load_str(&raw, input.format, &input.source)
    }

    /// Run the full pipeline
    pub fn run(&self, inputs: Vec<SourceInput>) -> PipelineOutput {
        let mut summaries = Vec::with_capacity(inputs.len());
        let mut tables = Vec::with_capacity(inputs.len());

        for input in inputs {
            let source = input.source.clone();
            match self.load_source(input) {
                Ok(table) => {
                    summaries.push(table.summary());
                    tables.push(table);
                }
                Err(e) => {
                    warn!(source = %source, error = %e, "source failed to load");
                    summaries.push(SourceSummary {
                        source,
                        total_records: 0,
                        kept: 0,
                        dropped: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let table = ActivityAggregator::merge(tables);
        let daily_aggregate = ActivityAggregator::daily_by_source(&table);
        let daily_series = ActivityAggregator::daily_series(&table);
        let prediction = self.predict_next_day(&daily_series);

        info!(
            events = table.len(),
            days = daily_series.len(),
            prediction_available = prediction.prediction().is_some(),
            "pipeline run complete"
        );

        PipelineOutput {
            timezone: self.timezone(),
            sources: summaries,
            table,
            daily_aggregate,
            daily_series,
            prediction,
        }
    }

    /// Predict the day after the history snapshot, or after `live` when no
    /// snapshot is configured
    pub fn predict_next_day(&self, live: &DailyActivitySeries) -> PredictionOutcome {
        match self.try_predict(live) {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(code = e.code(), error = %e, "prediction unavailable");
                PredictionOutcome::Unavailable {
                    code: e.code().to_string(),
                    reason: e.to_string(),
                }
            }
        }
    }

    fn try_predict(&self, live: &DailyActivitySeries) -> Result<PredictionOutcome, PipelineError> {
        let series = match &self.history {
            Some(Ok(snapshot)) => snapshot,
            Some(Err(e)) => {
                return Err(PipelineError::ModelUnavailable(format!(
                    "history snapshot unavailable: {e}"
                )))
            }
            None => live,
        };

        let features = FeatureBuilder::next_day(series)?;
        let predictor = self
            .predictor
            .as_ref()
            .map_err(|e| PipelineError::ModelUnavailable(model_reason(e)))?;
        let prediction = predictor.predict(&features)?;

        Ok(PredictionOutcome::Available {
            features,
            prediction,
        })
    }
}

fn model_reason(error: &PipelineError) -> String {
    match error {
        PipelineError::ModelUnavailable(reason) => reason.clone(),
        other => other.to_string(),
    }
}

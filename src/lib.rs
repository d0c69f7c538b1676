//! Life in Data - personal activity analytics over Takeout exports
//!
//! Turns Chrome, YouTube and Maps activity histories into a unified event
//! table, daily activity counts, calendar insights and a next-day activity
//! prediction through a deterministic pipeline: source adaptation →
//! normalization → timestamp parsing → aggregation → features → prediction.
//!
//! ## Modules
//!
//! - **Loading**: `schema`, `adapters`, `normalizer`, `timestamp`, `loader`
//! - **Analysis**: `aggregator`, `insights`, `filter`
//! - **Prediction**: `features`, `predictor`
//! - **Output**: `encoder`, `export`

pub mod adapters;
pub mod aggregator;
pub mod config;
pub mod encoder;
pub mod error;
pub mod export;
pub mod features;
pub mod filter;
pub mod insights;
pub mod loader;
pub mod normalizer;
pub mod pipeline;
pub mod predictor;
pub mod schema;
pub mod timestamp;
pub mod types;

pub use aggregator::{ActivityAggregator, ActivityTable, DailyActivitySeries};
pub use config::PipelineConfig;
pub use error::PipelineError;
pub use filter::{apply_filters, EventFilter};
pub use pipeline::{activity_report, ActivityPipeline, PipelineOutput, SourceInput};
pub use predictor::{ActivityClassifier, Predictor};

// Schema exports
pub use schema::{InputFormat, RawRecord, RawRecordAdapter};

/// Crate version embedded in every report
pub const LIFEDATA_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Producer name for reports
pub const PRODUCER_NAME: &str = "life-in-data";

//! Collection parsing for raw activity exports
//!
//! A whole collection either parses or is rejected as a malformed source.
//! Individual record problems (bad timestamps) are handled later by the loader.

use crate::error::PipelineError;
use crate::schema::raw_record::{InputFormat, RawRecord};
use crate::types::Source;

/// Adapter for turning export text into raw records
pub struct RawRecordAdapter;

impl RawRecordAdapter {
    /// Parse a collection in the given layout
    pub fn parse(
        raw: &str,
        format: InputFormat,
        source: &Source,
    ) -> Result<Vec<RawRecord>, PipelineError> {
        match format {
            InputFormat::Json => Self::parse_array(raw, source),
            InputFormat::Ndjson => Self::parse_ndjson(raw, source),
        }
    }

    /// Parse a JSON array of records
    pub fn parse_array(json: &str, source: &Source) -> Result<Vec<RawRecord>, PipelineError> {
        serde_json::from_str::<Vec<RawRecord>>(json)
            .map_err(|e| PipelineError::malformed(source.as_str(), e.to_string()))
    }

    /// Parse NDJSON (newline-delimited JSON) records
    pub fn parse_ndjson(ndjson: &str, source: &Source) -> Result<Vec<RawRecord>, PipelineError> {
        let mut records = Vec::new();
        for (line_num, line) in ndjson.lines().enumerate() {
            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            match serde_json::from_str::<RawRecord>(trimmed) {
                Ok(record) => records.push(record),
                Err(e) => {
                    return Err(PipelineError::malformed(
                        source.as_str(),
                        format!("Failed to parse line {}: {}", line_num + 1, e),
                    ));
                }
            }
        }
        Ok(records)
    }
}

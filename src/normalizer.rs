//! Record normalization
//!
//! This module maps one raw record into the canonical record shape.
//! - Missing or mistyped optional fields become empty strings
//! - `url` comes from `titleUrl`
//! - `extra` is dispatched on the source tag through the adapter registry

use crate::adapters::AdapterRegistry;
use crate::schema::RawRecord;
use crate::types::{NormalizedRecord, Source};

/// Normalizer for converting raw records into normalized records
pub struct RecordNormalizer {
    registry: AdapterRegistry,
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(AdapterRegistry::with_defaults())
    }
}

impl RecordNormalizer {
    pub fn new(registry: AdapterRegistry) -> Self {
        Self { registry }
    }

    /// Normalize one record for the given source
    pub fn normalize(&self, record: &RawRecord, source: &Source) -> NormalizedRecord {
        NormalizedRecord {
            time: record.time_text().map(str::to_string),
            title: record.title(),
            url: record.title_url(),
            source: source.clone(),
            extra: self.registry.extra_for(source, record),
            header: record.header(),
        }
    }
}

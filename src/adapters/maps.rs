//! Maps activity adapter

use crate::schema::RawRecord;
use crate::types::Source;

use super::SourceAdapter;

/// Maps keeps place details in the free-text `description`.
pub struct MapsAdapter;

impl SourceAdapter for MapsAdapter {
    fn source(&self) -> Source {
        Source::Maps
    }

    fn extra(&self, record: &RawRecord) -> String {
        record.description()
    }
}

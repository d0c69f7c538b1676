//! Chrome history adapter

use crate::schema::RawRecord;
use crate::types::Source;

use super::SourceAdapter;

/// Chrome records carry no secondary detail; `extra` mirrors the header.
pub struct ChromeAdapter;

impl SourceAdapter for ChromeAdapter {
    fn source(&self) -> Source {
        Source::Chrome
    }

    fn extra(&self, record: &RawRecord) -> String {
        record.header()
    }
}

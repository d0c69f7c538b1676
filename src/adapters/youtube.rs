//! YouTube watch history adapter
//!
//! The channel name lives in the first `subtitles` entry.

use crate::schema::RawRecord;
use crate::types::Source;

use super::SourceAdapter;

pub struct YouTubeAdapter;

impl SourceAdapter for YouTubeAdapter {
    fn source(&self) -> Source {
        Source::YouTube
    }

    fn extra(&self, record: &RawRecord) -> String {
        record.first_subtitle_name()
    }
}

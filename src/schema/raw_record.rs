//! Takeout "My Activity" record shape
//!
//! Chrome, YouTube and Maps exports share one loose record layout: every field
//! is optional and may carry an unexpected JSON type. Fields are kept as raw
//! JSON values and coerced to text on access, so a wrongly-typed optional
//! field never rejects the record.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Supported collection layouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InputFormat {
    /// JSON array of records (the Takeout default)
    #[default]
    Json,
    /// Newline-delimited JSON (one record per line)
    Ndjson,
}

/// One raw activity record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<Value>,
    #[serde(default, rename = "titleUrl", skip_serializing_if = "Option::is_none")]
    pub title_url: Option<Value>,
    /// YouTube channel entries: `[{ "name": ..., "url": ... }]`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitles: Option<Value>,
    /// Maps free-text description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<Value>,
    /// Fields this pipeline does not read (products, activityControls, ...)
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

impl RawRecord {
    pub fn header(&self) -> String {
        text_or_empty(self.header.as_ref())
    }

    pub fn title(&self) -> String {
        text_or_empty(self.title.as_ref())
    }

    pub fn title_url(&self) -> String {
        text_or_empty(self.title_url.as_ref())
    }

    pub fn description(&self) -> String {
        text_or_empty(self.description.as_ref())
    }

    /// Name of the first `subtitles` entry, if any
    pub fn first_subtitle_name(&self) -> String {
        let name = self
            .subtitles
            .as_ref()
            .and_then(Value::as_array)
            .and_then(|entries| entries.first())
            .and_then(|entry| entry.get("name"));
        text_or_empty(name)
    }

    /// Raw timestamp text; `None` when absent or not a string
    pub fn time_text(&self) -> Option<&str> {
        self.time
            .as_ref()
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Coerce an optional JSON value to text. Strings pass through; numbers and
/// booleans are rendered; null, arrays and objects become empty.
fn text_or_empty(value: Option<&Value>) -> String {
    match value {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    }
}

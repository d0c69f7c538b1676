//! CSV export of the event table

use crate::aggregator::ActivityTable;
use crate::types::ActivityEvent;
use chrono::SecondsFormat;
use std::io::{self, Write};

/// Column order of exported rows
pub const CSV_COLUMNS: [&str; 9] = [
    "time", "title", "url", "source", "extra", "header", "date", "hour", "weekday",
];

/// Write `table` as CSV with a header row
pub fn write_csv<W: Write>(table: &ActivityTable, mut out: W) -> io::Result<()> {
    writeln!(out, "{}", CSV_COLUMNS.join(","))?;
    for event in table.iter() {
        writeln!(out, "{}", csv_row(event))?;
    }
    Ok(())
}

/// Render `table` as a CSV string
pub fn to_csv_string(table: &ActivityTable) -> String {
    let mut buf = Vec::new();
    // Writing into a Vec cannot fail
    let _ = write_csv(table, &mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}

fn csv_row(event: &ActivityEvent) -> String {
    let fields = [
        event.timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        event.title.clone(),
        event.url.clone(),
        event.source.to_string(),
        event.extra.clone(),
        event.header.clone(),
        event.date.to_string(),
        event.hour.to_string(),
        event.weekday.clone(),
    ];
    fields
        .iter()
        .map(|f| escape(f))
        .collect::<Vec<_>>()
        .join(",")
}

fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::SourceLoader;
    use crate::schema::InputFormat;
    use crate::types::Source;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_csv_export() {
        let loaded = SourceLoader::default()
            .load_str(
                r#"[
                    {"header": "YouTube", "title": "Watched \"Rust, fast\"", "titleUrl": "https://youtu.be/x",
                     "subtitles": [{"name": "Channel"}], "time": "2024-01-01T09:15:00Z"}
                ]"#,
                InputFormat::Json,
                &Source::YouTube,
            )
            .unwrap();
        let csv = to_csv_string(&ActivityTable::new(loaded.events));

        assert_eq!(
            csv,
            "time,title,url,source,extra,header,date,hour,weekday\n\
             2024-01-01T09:15:00Z,\"Watched \"\"Rust, fast\"\"\",https://youtu.be/x,YouTube,Channel,YouTube,2024-01-01,9,Monday\n"
        );
    }

    #[test]
    fn test_empty_table_has_header_only() {
        let csv = to_csv_string(&ActivityTable::default());
        assert_eq!(csv, "time,title,url,source,extra,header,date,hour,weekday\n");
    }
}

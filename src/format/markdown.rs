use std::fmt::Write;

use chrono::NaiveDate;

use crate::domain::Record;
use crate::format::{detail_fields, field_label};

const MISSING_TITLE: &str = "No Title";

/// Markdown digest: feed heading with entry count, date line, and one
/// section per record.
pub fn render_markdown(records: &[Record], feed_name: &str, date: NaiveDate) -> String {
    let mut out = String::new();

    let _ = write!(out, "# {} ({} entries)\n\n", feed_name, records.len());
    let _ = write!(out, "Date: {}\n\n", date.format("%Y-%m-%d"));

    for record in records {
        let _ = writeln!(out, "## {}", record.display_title(MISSING_TITLE));

        for (name, value) in detail_fields(record) {
            let _ = write!(out, "**{}:** {}\n\n", field_label(name), value);
        }

        if let Some(link) = record.get("link").filter(|l| !l.is_empty()) {
            let _ = write!(out, "[View Article]({})\n\n", link);
        }
    }

    out
}

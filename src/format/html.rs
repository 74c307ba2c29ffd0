use std::fmt::Write;

use chrono::NaiveDate;
use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::domain::Record;
use crate::format::{detail_fields, field_label};

/// Standalone HTML page with the same content as the markdown digest.
pub fn render_html(records: &[Record], feed_name: &str, date: NaiveDate) -> String {
    let name = encode_text(feed_name);
    let mut out = String::new();

    let _ = writeln!(
        out,
        "<html><head><meta charset='utf-8'><title>{}</title></head><body>",
        name
    );
    let _ = writeln!(out, "<h1>{} ({} entries)</h1>", name, records.len());
    let _ = writeln!(out, "<p>Date: {}</p>", date.format("%Y-%m-%d"));

    for record in records {
        let _ = writeln!(out, "<h2>{}</h2>", encode_text(record.display_title("No Title")));
        for (field, value) in detail_fields(record) {
            let _ = writeln!(
                out,
                "<p><strong>{}:</strong> {}</p>",
                encode_text(&field_label(field)),
                encode_text(value)
            );
        }
        if let Some(link) = record.get("link").filter(|l| !l.is_empty()) {
            let _ = writeln!(
                out,
                "<p><a href=\"{}\">View Article</a></p>",
                encode_double_quoted_attribute(link)
            );
        }
        out.push_str("<hr>\n");
    }

    out.push_str("</body></html>\n");
    out
}

use crate::domain::Record;
use crate::format::{detail_fields, field_label};

const MISSING_TITLE: &str = "N/A";

/// Flat enumerated listing, the form handed to the summarizer.
///
/// ```text
/// [0] Title: <title>
/// <Label>: <value>
///
/// [1] Title: ...
/// ```
pub fn render_text(records: &[Record]) -> String {
    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            let title = record.display_title(MISSING_TITLE);
            let mut lines = vec![format!("[{}] Title: {}", i, title)];
            lines.extend(
                detail_fields(record).map(|(name, value)| format!("{}: {}", field_label(name), value)),
            );
            lines.join("\n")
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

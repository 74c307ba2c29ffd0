//! Deterministic renderings of normalized records.
//!
//! Every renderer walks record fields in insertion order, puts the title
//! first, and skips empty values.

pub mod html;
pub mod markdown;
pub mod text;

pub use html::render_html;
pub use markdown::render_markdown;
pub use text::render_text;

use crate::domain::Record;

/// Display label for a field name: each run of letters is capitalized, so
/// `pub_date` becomes `Pub_Date`.
pub fn field_label(name: &str) -> String {
    let mut label = String::with_capacity(name.len());
    let mut prev_is_letter = false;

    for c in name.chars() {
        if c.is_alphabetic() {
            if prev_is_letter {
                label.extend(c.to_lowercase());
            } else {
                label.extend(c.to_uppercase());
            }
            prev_is_letter = true;
        } else {
            label.push(c);
            prev_is_letter = false;
        }
    }

    label
}

/// Non-title fields with a value, in record order.
pub(crate) fn detail_fields(record: &Record) -> impl Iterator<Item = (&str, &str)> {
    record
        .iter()
        .filter(|(name, value)| *name != "title" && !value.is_empty())
}

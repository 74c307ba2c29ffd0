use crate::domain::Feed;
use crate::normalizer::SourceConfig;

/// Display name of every synthesized configuration.
pub const GENERIC_FEED_NAME: &str = "Generic RSS";

/// Attributes probed on the first entry, in output order.
pub const CANDIDATE_FIELDS: [&str; 6] = ["title", "link", "summary", "published", "author", "description"];

/// Build a best-effort configuration for a feed no registered source covers.
///
/// Only the first entry is probed; its schema is assumed to hold for the
/// rest of the feed. Each probed attribute maps to a field of the same name.
pub fn generic_config(feed: &Feed) -> SourceConfig {
    let mut config = SourceConfig::new(GENERIC_FEED_NAME);

    if let Some(entry) = feed.first_entry() {
        for name in CANDIDATE_FIELDS {
            if entry.has(name) {
                config.set_field(name, name);
            }
        }
    }

    config
}

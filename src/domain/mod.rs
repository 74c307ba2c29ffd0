pub mod feed;
pub mod record;

pub use feed::{Entry, Feed, Value};
pub use record::Record;

pub mod context;
pub mod error;
pub mod job;

pub use context::AppContext;
pub use error::{PaperfeedError, Result};

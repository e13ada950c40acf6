//! CLI command implementations.

mod chunks;
mod config;
mod search;

pub use chunks::run_chunks;
pub use config::run_config;
pub use search::{run_search, SearchOverrides};

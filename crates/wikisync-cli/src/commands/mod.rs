//! Command implementations for wikisync-cli

pub mod history;
pub mod sync;

pub use history::run_history;
pub use sync::{run_plan, run_sync};

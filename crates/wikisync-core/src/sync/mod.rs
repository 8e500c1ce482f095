//! Run orchestration

mod engine;
mod report;

pub use engine::{SyncEngine, SyncOptions};
pub use report::SyncResult;

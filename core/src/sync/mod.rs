pub mod flows;
mod inflight;
pub mod synchronizer;
pub mod types;

pub use flows::{create_task, refresh_store};
pub use synchronizer::StatusSynchronizer;
pub use types::SyncOutcome;

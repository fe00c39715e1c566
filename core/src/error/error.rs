use thiserror::Error;

use super::api::ApiError;
use crate::domain::TaskId;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("config error: {0}")]
    Config(String),
    #[error("{}", .0.user_message())]
    Api(#[from] ApiError),
    #[error("status update failed: {0}")]
    Sync(#[from] SyncError),
    #[error("status update rolled back: {0}")]
    RolledBack(String),
    #[error("command failed: {0}")]
    Command(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("task {0} is not in the local store")]
    TaskNotFound(TaskId),
}

/// Errors `update_status` reports before anything was changed.
///
/// Remote failures are not in here: they are absorbed by a rollback and
/// reported through `SyncOutcome::RolledBack`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SyncError {
    #[error("task {0} is not in the local store")]
    TaskNotFound(TaskId),
    #[error("task {0} already has a status update in flight")]
    InFlight(TaskId),
}

impl From<StoreError> for SyncError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::TaskNotFound(id) => SyncError::TaskNotFound(id),
        }
    }
}

use crate::domain::{Task, TaskId};
use crate::error::ApiError;

/// Result of one `update_status` call.
#[derive(Debug)]
pub enum SyncOutcome {
    /// The task already had the requested status. Nothing was sent.
    Unchanged(Task),
    /// The authority accepted the update; the store holds its record.
    Reconciled(Task),
    /// The authority call failed; the task was restored to `restored`.
    RolledBack { restored: Task, error: ApiError },
    /// A newer call on the same task took over before this one resolved.
    /// Its response was not applied to the store.
    Superseded { task_id: TaskId },
}

impl SyncOutcome {
    pub fn is_rolled_back(&self) -> bool {
        matches!(self, Self::RolledBack { .. })
    }

    /// Message for the presentation layer when the update did not stick.
    pub fn error_message(&self) -> Option<String> {
        match self {
            Self::RolledBack { error, .. } => Some(error.user_message()),
            _ => None,
        }
    }

    pub fn task(&self) -> Option<&Task> {
        match self {
            Self::Unchanged(task) | Self::Reconciled(task) => Some(task),
            Self::RolledBack { restored, .. } => Some(restored),
            Self::Superseded { .. } => None,
        }
    }
}

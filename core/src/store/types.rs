use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::domain::{Task, TaskId, TaskStatus};

/// Prior state of one task, taken before an optimistic change.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSnapshot {
    task: Task,
}

impl TaskSnapshot {
    pub fn new(task: Task) -> Self {
        Self { task }
    }

    pub fn task_id(&self) -> TaskId {
        self.task.id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn into_task(self) -> Task {
        self.task
    }
}

/// Mutations published by the store.
#[derive(Debug, Clone, Serialize)]
pub enum StoreEvent {
    Loaded {
        count: usize,
        timestamp: DateTime<Utc>,
    },
    Inserted {
        task_id: TaskId,
        timestamp: DateTime<Utc>,
    },
    OptimisticApplied {
        task_id: TaskId,
        from: TaskStatus,
        to: TaskStatus,
        timestamp: DateTime<Utc>,
    },
    Reconciled {
        task_id: TaskId,
        status: TaskStatus,
        timestamp: DateTime<Utc>,
    },
    RolledBack {
        task_id: TaskId,
        restored: TaskStatus,
        timestamp: DateTime<Utc>,
    },
}

impl StoreEvent {
    pub fn task_id(&self) -> Option<TaskId> {
        match self {
            Self::Loaded { .. } => None,
            Self::Inserted { task_id, .. }
            | Self::OptimisticApplied { task_id, .. }
            | Self::Reconciled { task_id, .. }
            | Self::RolledBack { task_id, .. } => Some(*task_id),
        }
    }
}

//! Local task store

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{broadcast, RwLock};

use super::types::{StoreEvent, TaskSnapshot};
use crate::domain::{Task, TaskId, TaskStatus};
use crate::error::StoreError;
use crate::progress::WorkorderProgress;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Ordered in-memory task list. The only code path that mutates tasks.
#[derive(Clone)]
pub struct TaskStore {
    inner: Arc<TaskStoreInner>,
}

struct TaskStoreInner {
    tasks: RwLock<Vec<Task>>,
    event_tx: broadcast::Sender<StoreEvent>,
}

impl Default for TaskStore {
    fn default() -> Self {
        Self::new()
    }
}

impl TaskStore {
    pub fn new() -> Self {
        Self::with_tasks(Vec::new())
    }

    pub fn with_tasks(tasks: Vec<Task>) -> Self {
        let (event_tx, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(TaskStoreInner {
                tasks: RwLock::new(tasks),
                event_tx,
            }),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<StoreEvent> {
        self.inner.event_tx.subscribe()
    }

    fn emit(&self, event: StoreEvent) {
        // No subscribers is fine.
        let _ = self.inner.event_tx.send(event);
    }

    pub async fn list(&self) -> Vec<Task> {
        self.inner.tasks.read().await.clone()
    }

    pub async fn get(&self, id: TaskId) -> Option<Task> {
        self.inner
            .tasks
            .read()
            .await
            .iter()
            .find(|t| t.id == id)
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.inner.tasks.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.inner.tasks.read().await.is_empty()
    }

    pub async fn for_workorder(&self, workorder_id: &str) -> Vec<Task> {
        self.inner
            .tasks
            .read()
            .await
            .iter()
            .filter(|t| t.workorder_id == workorder_id)
            .cloned()
            .collect()
    }

    pub async fn progress(&self, workorder_id: &str) -> WorkorderProgress {
        let tasks = self.inner.tasks.read().await;
        WorkorderProgress::from_tasks(workorder_id, tasks.iter())
    }

    /// Listing flow: replace everything, keeping the authority's order.
    pub async fn replace_all(&self, tasks: Vec<Task>) {
        let count = tasks.len();
        *self.inner.tasks.write().await = tasks;
        self.emit(StoreEvent::Loaded {
            count,
            timestamp: Utc::now(),
        });
    }

    /// Creation flow: newest first. A record with a known id replaces it in place.
    pub async fn insert(&self, task: Task) {
        let task_id = task.id;
        {
            let mut tasks = self.inner.tasks.write().await;
            match tasks.iter_mut().find(|t| t.id == task_id) {
                Some(slot) => *slot = task,
                None => tasks.insert(0, task),
            }
        }
        self.emit(StoreEvent::Inserted {
            task_id,
            timestamp: Utc::now(),
        });
    }

    /// Sets only the status of `id`.
    ///
    /// Returns `None` without touching anything when the task already has
    /// `status`; otherwise the record as it was before the change.
    pub async fn apply_optimistic(
        &self,
        id: TaskId,
        status: TaskStatus,
    ) -> Result<Option<TaskSnapshot>, StoreError> {
        let snapshot = {
            let mut tasks = self.inner.tasks.write().await;
            let task = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(StoreError::TaskNotFound(id))?;
            if task.status == status {
                return Ok(None);
            }
            let snapshot = TaskSnapshot::new(task.clone());
            task.status = status;
            snapshot
        };
        self.emit(StoreEvent::OptimisticApplied {
            task_id: id,
            from: snapshot.task().status,
            to: status,
            timestamp: Utc::now(),
        });
        Ok(Some(snapshot))
    }

    /// Replaces the entry for `id` wholesale with the authority's record.
    pub async fn reconcile(&self, id: TaskId, canonical: Task) -> Result<(), StoreError> {
        let status = canonical.status;
        if canonical.id != id {
            tracing::warn!(
                target: "workshop.store",
                task_id = id,
                canonical_id = canonical.id,
                "canonical record carries a different id"
            );
        }
        {
            let mut tasks = self.inner.tasks.write().await;
            let slot = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(StoreError::TaskNotFound(id))?;
            *slot = canonical;
        }
        self.emit(StoreEvent::Reconciled {
            task_id: id,
            status,
            timestamp: Utc::now(),
        });
        Ok(())
    }

    /// Restores the task named by `snapshot`. Every other task is left alone.
    pub async fn rollback(&self, snapshot: TaskSnapshot) -> Result<(), StoreError> {
        let id = snapshot.task_id();
        let restored = snapshot.task().status;
        {
            let mut tasks = self.inner.tasks.write().await;
            let slot = tasks
                .iter_mut()
                .find(|t| t.id == id)
                .ok_or(StoreError::TaskNotFound(id))?;
            *slot = snapshot.into_task();
        }
        self.emit(StoreEvent::RolledBack {
            task_id: id,
            restored,
            timestamp: Utc::now(),
        });
        Ok(())
    }
}

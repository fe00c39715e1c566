//! Listing and creation flows that feed the store.

use crate::authority::TaskAuthority;
use crate::domain::{Task, TaskCreate};
use crate::error::ApiError;
use crate::store::TaskStore;

/// Replaces the store with the authority's task list. Returns the task count.
pub async fn refresh_store(
    store: &TaskStore,
    authority: &dyn TaskAuthority,
) -> Result<usize, ApiError> {
    let tasks = authority.list_tasks().await?;
    let count = tasks.len();
    store.replace_all(tasks).await;
    tracing::debug!(
        target: "workshop.sync",
        stage = "sync.refresh.out",
        authority = authority.name(),
        count = count
    );
    Ok(count)
}

/// Creates a task remotely and puts the authority's record at the top of the store.
pub async fn create_task(
    store: &TaskStore,
    authority: &dyn TaskAuthority,
    payload: TaskCreate,
) -> Result<Task, ApiError> {
    let task = authority.create_task(payload).await?;
    store.insert(task.clone()).await;
    Ok(task)
}

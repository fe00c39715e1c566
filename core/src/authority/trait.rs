use async_trait::async_trait;

use crate::domain::{
    Customer, Employee, LoginResponse, Task, TaskCreate, TaskId, TaskUpdate, Workorder,
    WorkorderCreate, WorkorderPatch, WorkorderStatus,
};
use crate::error::ApiError;

/// Remote authority for task records.
#[async_trait]
pub trait TaskAuthority: Send + Sync {
    fn name(&self) -> &str;

    /// Ordered task list. An empty list when no credential is available.
    async fn list_tasks(&self) -> Result<Vec<Task>, ApiError>;

    async fn create_task(&self, payload: TaskCreate) -> Result<Task, ApiError>;

    /// Sends the complete representation and returns the canonical record.
    async fn update_task(&self, id: TaskId, payload: TaskUpdate) -> Result<Task, ApiError>;
}

#[async_trait]
pub trait WorkshopDirectory: Send + Sync {
    async fn list_workorders(
        &self,
        status: Option<WorkorderStatus>,
    ) -> Result<Vec<Workorder>, ApiError>;

    async fn create_workorder(&self, payload: WorkorderCreate) -> Result<Workorder, ApiError>;

    async fn update_workorder(
        &self,
        id: &str,
        patch: WorkorderPatch,
    ) -> Result<Workorder, ApiError>;

    async fn list_customers(&self) -> Result<Vec<Customer>, ApiError>;

    async fn list_employees(&self) -> Result<Vec<Employee>, ApiError>;
}

#[async_trait]
pub trait Authenticator: Send + Sync {
    async fn login(&self, username: &str, password: &str) -> Result<LoginResponse, ApiError>;

    /// Drops the stored credential.
    fn logout(&self) -> anyhow::Result<()>;
}

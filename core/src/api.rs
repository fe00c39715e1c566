//! Stable re-exports for consumers (`cli`, `plugins`, and external crates).
//!
//! Prefer importing from `workshop_core::api` instead of reaching into internal modules.

pub use crate::authority::{Authenticator, TaskAuthority, WorkshopDirectory};
pub use crate::config::{
    load_default, ApiConfig, AppConfig, InFlightPolicy, LoggingConfig, SyncConfig,
};
pub use crate::context::{AppContext, Services, ServicesFactory};
pub use crate::domain::{
    Customer, Employee, LoginResponse, Role, Task, TaskCreate, TaskId, TaskStatus, TaskUpdate,
    Workorder, WorkorderCreate, WorkorderPatch, WorkorderStatus,
};
pub use crate::error::{ApiError, ApiErrorKind, CliError, StoreError, SyncError};
pub use crate::progress::WorkorderProgress;
pub use crate::store::{StoreEvent, TaskSnapshot, TaskStore};
pub use crate::sync::{create_task, refresh_store, StatusSynchronizer, SyncOutcome};

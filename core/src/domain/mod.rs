//! Records exchanged with the workshop API.

mod directory;
mod task;
mod workorder;

pub use directory::{Customer, Employee, LoginResponse, Role};
pub use task::{Task, TaskCreate, TaskId, TaskStatus, TaskUpdate};
pub use workorder::{Workorder, WorkorderCreate, WorkorderPatch, WorkorderStatus};

#[allow(clippy::module_inception)]
pub mod store;
pub mod types;

pub use store::TaskStore;
pub use types::{StoreEvent, TaskSnapshot};

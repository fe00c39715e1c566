#[allow(clippy::module_inception)]
pub mod error;
pub mod api;

pub use api::{ApiError, ApiErrorKind};
pub use error::{CliError, StoreError, SyncError};

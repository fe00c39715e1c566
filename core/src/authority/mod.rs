pub mod r#trait;

pub use r#trait::{Authenticator, TaskAuthority, WorkshopDirectory};

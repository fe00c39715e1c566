//! Workshop task store and optimistic status synchronizer.

pub mod api;
pub mod authority;
pub mod config;
pub mod context;
pub mod domain;
pub mod error;
pub mod progress;
pub mod store;
pub mod sync;

//! workshop-cli library: command handlers and rendering, exposed for tests.

pub mod commands;
pub mod events;
pub mod render;

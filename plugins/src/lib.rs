//! HTTP-backed services for the workshop dashboard.

pub mod credentials;
pub mod factory;
pub mod http;

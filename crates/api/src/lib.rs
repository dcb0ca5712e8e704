//! HTTP API: authentication, request context, policy guards and routing.

pub mod app;
pub mod config;
pub mod context;
pub mod middleware;
pub mod policy;

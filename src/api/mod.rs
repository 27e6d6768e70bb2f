//! HTTP surface: router, handlers, and server settings.

pub mod config;
pub mod routes;
pub mod server;

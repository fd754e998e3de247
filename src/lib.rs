//! Wicket - a minimal one-request-per-connection HTTP/1.1 server
//!
//! Core library: the per-connection protocol engine, the application
//! contract, and the tokio glue that runs it.

pub mod app;
pub mod config;
pub mod http;
pub mod server;

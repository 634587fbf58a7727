//! Adam - Minimal Asynchronous HTTP Server
//!
//! Core library: HTTP parsing, response building, route dispatch and the
//! per-connection session state machine.

pub mod config;
pub mod http;
pub mod router;
pub mod server;

//! Connection acceptance and per-connection session handling.

pub mod listener;
pub mod session;

//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 subset the server engine speaks:
//! incremental request parsing, typed response construction and response
//! serialization, with keep-alive connection reuse.
//!
//! # Submodules
//!
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation and header helpers
//! - **`response`**: HTTP response kinds (content, file, error) with builder
//! - **`writer`**: Serializes and writes HTTP responses to the client
//! - **`mime`**: MIME type detection based on file extensions
//!
//! The connection state machine that drives reading and writing lives in
//! [`crate::server::session`]:
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Wait for a complete request
//!        └──────┬──────┘
//!               │ Request parsed
//!               ▼
//!        ┌──────────────────┐
//!        │   Dispatching    │ ← Route lookup, handler produces response
//!        └──────┬───────────┘
//!               │ Response ready
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ├─ Keep-Alive → Reading (same connection)
//!               └─ Close → Closing
//! ```

pub mod mime;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

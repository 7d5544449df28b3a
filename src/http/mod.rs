//! HTTP protocol implementation.
//!
//! This module implements the HTTP/1.1 wire protocol for a server that answers
//! exactly one request per connection.
//!
//! # Architecture
//!
//! - **`connection`**: Drives one request-response exchange on an accepted stream
//! - **`parser`**: Parses incoming HTTP requests from byte buffers
//! - **`request`**: HTTP request representation
//! - **`response`**: HTTP response representation with builder pattern
//! - **`encoding`**: `Accept-Encoding` negotiation and gzip compression
//! - **`writer`**: Serializes and writes HTTP responses to the client
//!
//! # Connection State Machine
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← Buffer bytes until a full request arrives
//!        └──────┬──────┘
//!               │ Request received (malformed → 400, skip to Writing)
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← Route lookup and handler call
//!        └──────┬───────────┘
//!               │ Response serialized
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← Send response to client
//!        └──────┬───────────┘
//!               │ Response sent
//!               ▼
//!        ┌──────────────────┐
//!        │     Closed       │
//!        └──────────────────┘
//! ```
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use tinyhttp::handlers::default_router;
//! use tinyhttp::http::connection::{Connection, ConnectionLimits};
//! use tinyhttp::routing::HandlerContext;
//! use tokio::net::TcpListener;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let listener = TcpListener::bind("127.0.0.1:4221").await?;
//!     let router = Arc::new(default_router());
//!     let ctx = Arc::new(HandlerContext::new());
//!
//!     loop {
//!         let (socket, _addr) = listener.accept().await?;
//!         let conn = Connection::new(socket, router.clone(), ctx.clone(), ConnectionLimits::default());
//!         if let Err(e) = conn.run().await {
//!             eprintln!("Connection error: {}", e);
//!         }
//!     }
//! }
//! ```

pub mod connection;
pub mod encoding;
pub mod parser;
pub mod request;
pub mod response;
pub mod writer;

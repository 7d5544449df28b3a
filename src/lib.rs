//! tinyhttp - a small HTTP/1.1 server
//!
//! Core library for request parsing, routing, response serialization and the
//! worker pool that serves connections.

pub mod config;
pub mod handlers;
pub mod http;
pub mod routing;
pub mod server;
pub mod storage;

//! Booth Map API server.
//!
//! Wires the `PostgreSQL` stores, the session resolver, the procedure router
//! and the HTTP transport together. The binary in `main.rs` owns startup and
//! shutdown; this library holds the pieces worth testing.

pub mod config;

pub use config::{Config, ConfigError};

//! Mock provider implementations for testing.
//!
//! Simple, in-memory implementations of the provider traits for use in unit
//! and integration tests.

pub mod session;

pub use session::MockSessionStore;

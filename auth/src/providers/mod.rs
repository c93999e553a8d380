//! Authentication providers.
//!
//! Traits for the external systems the session resolver depends on. The
//! resolver is generic over them, so tests substitute the in-memory
//! implementations from [`mocks`](crate::mocks).

pub mod session;

pub use session::{SessionStore, StoredSession};

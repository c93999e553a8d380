//! # Booth Map Core
//!
//! Domain types and contracts for the Booth Map procedure API.
//!
//! Organizers create events and place rectangular booths on a floor plan;
//! viewers browse events publicly. This crate holds everything that does not
//! depend on a transport or a database:
//!
//! - **Types**: identifiers and roles ([`types`])
//! - **Records**: users, events, booths and their projections ([`model`])
//! - **Inputs**: typed, validated request payloads ([`input`])
//! - **Errors**: the procedure error taxonomy ([`error`])
//! - **Sessions**: the resolved identity contract ([`session`])
//! - **Procedures**: kinds, tiers and authorization guards ([`procedure`])
//! - **Store**: the persistence gateway trait ([`store`])
//!
//! ## Request Flow
//!
//! ```text
//! transport → SessionResolver → Tier guards → input validation → handler → FloorPlanStore
//! ```
//!
//! Each stage short-circuits with a typed [`ProcedureError`] before the next
//! one runs.

pub mod error;
pub mod input;
pub mod model;
pub mod procedure;
pub mod session;
pub mod store;
pub mod types;

pub use error::{ErrorKind, ProcedureError, StoreError, ValidationIssue};
pub use procedure::{Caller, Guard, ProcedureKind, RequestContext, Tier};
pub use session::{Session, SessionResolver, SessionUser};
pub use store::FloorPlanStore;
pub use types::{BoothId, EventId, IdRef, Role, UserId};

// Re-export commonly used types
pub use chrono::{DateTime, Utc};

/// Environment traits injected into stores and resolvers.
///
/// All time-dependent behavior goes through [`Clock`](environment::Clock) so
/// tests can pin the current instant.
pub mod environment {
    use chrono::{DateTime, Utc};

    /// Clock trait - abstracts time operations for testability
    ///
    /// # Examples
    ///
    /// ```
    /// use boothmap_core::environment::{Clock, SystemClock};
    ///
    /// let clock = SystemClock;
    /// let earlier = clock.now();
    /// assert!(clock.now() >= earlier);
    /// ```
    pub trait Clock: Send + Sync {
        /// Get the current time
        fn now(&self) -> DateTime<Utc>;
    }

    /// Wall-clock time.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct SystemClock;

    impl Clock for SystemClock {
        fn now(&self) -> DateTime<Utc> {
            Utc::now()
        }
    }
}

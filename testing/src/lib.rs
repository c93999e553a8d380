//! # Booth Map Testing
//!
//! Testing utilities for the Booth Map procedure API.
//!
//! This crate provides:
//! - [`InMemoryFloorPlanStore`]: a complete in-memory persistence gateway
//! - Mock implementations of environment traits ([`mocks`])
//! - Record and session builders ([`fixtures`])
//!
//! ## Example
//!
//! ```ignore
//! use boothmap_testing::{InMemoryFloorPlanStore, fixtures};
//! use boothmap_runtime::AppRouter;
//!
//! #[tokio::test]
//! async fn organizer_creates_event() {
//!     let store = InMemoryFloorPlanStore::new();
//!     let alice = store.add_user(fixtures::organizer("alice"));
//!     let router = AppRouter::new(store);
//!
//!     let created = router
//!         .call("event.create", ProcedureKind::Mutation, &fixtures::context_for(&alice),
//!               Some(json!({ "name": "Spring Fair" })))
//!         .await
//!         .unwrap();
//!     assert_eq!(created["name"], "Spring Fair");
//! }
//! ```

use boothmap_core::environment::Clock;
use chrono::{DateTime, Utc};

mod floor_plan;

pub use floor_plan::InMemoryFloorPlanStore;

/// Mock implementations for testing.
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use boothmap_testing::mocks::FixedClock;
    /// use boothmap_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// let time1 = clock.now();
    /// let time2 = clock.now();
    /// assert_eq!(time1, time2); // Always the same!
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        FixedClock::new(DateTime::<Utc>::UNIX_EPOCH + chrono::Duration::days(20_089))
    }
}

/// Builders for users, sessions and command payloads.
pub mod fixtures {
    use boothmap_core::model::{NewBooth, NewEvent, User};
    use boothmap_core::procedure::RequestContext;
    use boothmap_core::session::{Session, SessionUser};
    use boothmap_core::types::{EventId, Role, UserId};
    use chrono::{Duration, Utc};

    /// A fresh user with `role`.
    #[must_use]
    pub fn user(username: &str, role: Role) -> User {
        User {
            id: UserId::new(),
            username: username.to_string(),
            role,
        }
    }

    /// A fresh organizer.
    #[must_use]
    pub fn organizer(username: &str) -> User {
        user(username, Role::Organizer)
    }

    /// A fresh viewer.
    #[must_use]
    pub fn viewer(username: &str) -> User {
        user(username, Role::Viewer)
    }

    /// A session for `user` that expires in one day.
    #[must_use]
    pub fn session_for(user: &User) -> Session {
        Session {
            user: SessionUser {
                id: user.id,
                username: user.username.clone(),
                role: user.role,
            },
            expires: Utc::now() + Duration::days(1),
        }
    }

    /// A request context carrying a session for `user`.
    #[must_use]
    pub fn context_for(user: &User) -> RequestContext {
        RequestContext::with_session(session_for(user))
    }

    /// Insert command for an event named `name`.
    #[must_use]
    pub fn new_event(created_by: UserId, name: &str) -> NewEvent {
        NewEvent {
            name: name.to_string(),
            description: None,
            created_by,
        }
    }

    /// Insert command for a minimum-size booth at the origin.
    #[must_use]
    pub fn new_booth(event_id: EventId, name: &str) -> NewBooth {
        NewBooth {
            event_id,
            x: 0.0,
            y: 0.0,
            width: 30.0,
            height: 30.0,
            name: name.to_string(),
            color: None,
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};

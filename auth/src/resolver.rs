//! Token-based session resolver.

use crate::providers::SessionStore;
use crate::token::extract_session_token;
use boothmap_core::environment::{Clock, SystemClock};
use boothmap_core::error::StoreError;
use boothmap_core::session::{Session, SessionResolver};
use http::HeaderMap;

/// Resolves a session from the request's session cookie or bearer token.
///
/// A session whose expiry is at or before the clock's current instant
/// resolves to `None`, as does a missing or unknown token.
#[derive(Debug, Clone)]
pub struct TokenSessionResolver<S, C = SystemClock> {
    store: S,
    clock: C,
}

impl<S: SessionStore> TokenSessionResolver<S> {
    /// Create a resolver on the wall clock.
    #[must_use]
    pub const fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
        }
    }
}

impl<S: SessionStore, C: Clock> TokenSessionResolver<S, C> {
    /// Create a resolver on `clock`.
    #[must_use]
    pub const fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// The underlying store.
    #[must_use]
    pub const fn store(&self) -> &S {
        &self.store
    }
}

impl<S: SessionStore, C: Clock> SessionResolver for TokenSessionResolver<S, C> {
    async fn resolve(&self, headers: &HeaderMap) -> Result<Option<Session>, StoreError> {
        let Some(token) = extract_session_token(headers) else {
            return Ok(None);
        };

        let Some(stored) = self.store.find_session(token).await? else {
            tracing::debug!("Session token not recognised");
            return Ok(None);
        };

        if stored.expires <= self.clock.now() {
            tracing::debug!(user_id = %stored.user.id, "Session expired");
            return Ok(None);
        }

        Ok(Some(Session {
            user: stored.user,
            expires: stored.expires,
        }))
    }
}

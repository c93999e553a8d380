//! Session store trait.

use boothmap_core::error::StoreError;
use boothmap_core::session::SessionUser;
use chrono::{DateTime, Utc};

/// A persisted session row joined with its user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredSession {
    /// Opaque token issued by the identity provider.
    pub session_token: String,
    /// The session's user.
    pub user: SessionUser,
    /// Expiry instant.
    pub expires: DateTime<Utc>,
}

/// Session store.
///
/// This trait abstracts over where the identity provider writes sessions
/// (the `sessions` table in production).
///
/// # Implementation Notes
///
/// - Read-only: sessions are issued and revoked by the identity provider
/// - Expired rows may be returned; expiry is checked by the resolver
pub trait SessionStore: Send + Sync {
    /// Look up a session by token.
    ///
    /// # Returns
    ///
    /// The session if a row with `token` exists.
    ///
    /// # Errors
    ///
    /// Returns error if the backend cannot be reached.
    fn find_session(
        &self,
        token: &str,
    ) -> impl std::future::Future<Output = Result<Option<StoredSession>, StoreError>> + Send;
}

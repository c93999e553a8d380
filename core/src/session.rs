//! Session contract.
//!
//! Sessions are issued by an external identity provider. This layer only
//! consumes their resolved shape and never re-validates credentials.

use crate::error::StoreError;
use crate::types::{Role, UserId};
use chrono::{DateTime, Utc};
use http::HeaderMap;
use serde::{Deserialize, Serialize};

/// Identity attached to a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    /// User ID.
    pub id: UserId,
    /// Display name.
    pub username: String,
    /// Role.
    pub role: Role,
}

/// A resolved, unexpired session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// The authenticated user.
    pub user: SessionUser,
    /// Expiry instant.
    pub expires: DateTime<Utc>,
}

/// Resolves request headers to a session.
///
/// # Implementation Notes
///
/// - No side effects
/// - Missing or unknown credentials resolve to `Ok(None)`, never an error
/// - `Err` is reserved for backend failures
pub trait SessionResolver: Send + Sync {
    /// Resolve the session carried by `headers`.
    ///
    /// # Errors
    ///
    /// Returns error if the session backend cannot be reached.
    fn resolve(
        &self,
        headers: &HeaderMap,
    ) -> impl std::future::Future<Output = Result<Option<Session>, StoreError>> + Send;
}

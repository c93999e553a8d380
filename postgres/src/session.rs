//! `PostgreSQL` session store.

use crate::map_db_error;
use boothmap_auth::providers::{SessionStore, StoredSession};
use boothmap_core::error::StoreError;
use boothmap_core::session::SessionUser;
use boothmap_core::types::{Role, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

#[derive(Debug, FromRow)]
struct SessionRow {
    session_token: String,
    expires: DateTime<Utc>,
    user_id: Uuid,
    username: String,
    role: String,
}

impl TryFrom<SessionRow> for StoredSession {
    type Error = StoreError;

    fn try_from(row: SessionRow) -> Result<Self, Self::Error> {
        let role: Role = row
            .role
            .parse()
            .map_err(|e| StoreError::Database(format!("Invalid role for user {}: {e}", row.user_id)))?;
        Ok(Self {
            session_token: row.session_token,
            user: SessionUser {
                id: UserId(row.user_id),
                username: row.username,
                role,
            },
            expires: row.expires,
        })
    }
}

/// Reads sessions written by the identity provider.
#[derive(Debug, Clone)]
pub struct PostgresSessionStore {
    pool: PgPool,
}

impl PostgresSessionStore {
    /// Create a session store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl SessionStore for PostgresSessionStore {
    async fn find_session(&self, token: &str) -> Result<Option<StoredSession>, StoreError> {
        let row = sqlx::query_as::<_, SessionRow>(
            r"
            SELECT s.session_token, s.expires, u.id AS user_id, u.username, u.role
            FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.session_token = $1
            ",
        )
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to load session"))?;

        row.map(StoredSession::try_from).transpose()
    }
}

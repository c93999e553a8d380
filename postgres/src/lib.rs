//! `PostgreSQL` persistence for Booth Map.
//!
//! This crate provides the production implementations of the persistence
//! contracts:
//!
//! - [`PostgresFloorPlanStore`]: events and booths ([`FloorPlanStore`](boothmap_core::store::FloorPlanStore))
//! - [`PostgresSessionStore`]: sessions written by the identity provider
//!   ([`SessionStore`](boothmap_auth::providers::SessionStore))
//!
//! Schema lives in `migrations/` and is embedded at compile time.
//!
//! # Example
//!
//! ```ignore
//! use boothmap_postgres::{PostgresFloorPlanStore, PostgresSessionStore};
//!
//! let pool = sqlx::PgPool::connect("postgres://localhost/boothmap").await?;
//! boothmap_postgres::migrate(&pool).await?;
//! let store = PostgresFloorPlanStore::new(pool.clone());
//! let sessions = PostgresSessionStore::new(pool);
//! ```

mod floor_plan;
mod session;

pub use floor_plan::PostgresFloorPlanStore;
pub use session::PostgresSessionStore;

use boothmap_core::error::StoreError;
use sqlx::PgPool;

/// Run the embedded migrations against `pool`.
///
/// # Errors
///
/// Returns error if migrations fail.
pub async fn migrate(pool: &PgPool) -> Result<(), StoreError> {
    sqlx::migrate!("./migrations")
        .run(pool)
        .await
        .map_err(|e| StoreError::Database(format!("Migration failed: {e}")))?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Classify a sqlx error. Constraint violations are reported as such; everything
/// else is a backend failure.
pub(crate) fn map_db_error(e: sqlx::Error, context: &str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.is_check_violation()
            || db_err.is_foreign_key_violation()
            || db_err.is_unique_violation()
        {
            return StoreError::Constraint(db_err.message().to_string());
        }
    }
    StoreError::Database(format!("{context}: {e}"))
}

//! `PostgreSQL` floor plan store.
//!
//! Every ownership-gated write carries the caller as a predicate of the same
//! statement that performs it, so a concurrent change can never slip between
//! the check and the write. `update_booths` is the only multi-statement
//! operation; it holds a shared lock on the event row for the duration of its
//! transaction.

use crate::map_db_error;
use boothmap_core::error::StoreError;
use boothmap_core::model::{
    Booth, BoothBatchUpdate, BoothPatch, Creator, Event, EventCounts, EventDetail, EventPatch,
    EventSummary, EventWithCreator, NewBooth, NewEvent,
};
use boothmap_core::store::FloorPlanStore;
use boothmap_core::types::{BoothId, EventId, UserId};
use chrono::{DateTime, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

const BOOTH_COLUMNS: &str = "b.id, b.event_id, b.x, b.y, b.width, b.height, b.name, b.color, b.created_at";

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_by: Uuid,
    created_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: EventId(row.id),
            name: row.name,
            description: row.description,
            created_by: UserId(row.created_by),
            created_at: row.created_at,
        }
    }
}

#[derive(Debug, FromRow)]
struct EventWithCreatorRow {
    #[sqlx(flatten)]
    event: EventRow,
    creator_username: String,
}

impl From<EventWithCreatorRow> for EventWithCreator {
    fn from(row: EventWithCreatorRow) -> Self {
        let creator = Creator {
            id: UserId(row.event.created_by),
            username: row.creator_username,
        };
        Self {
            event: row.event.into(),
            creator,
        }
    }
}

#[derive(Debug, FromRow)]
struct EventListingRow {
    #[sqlx(flatten)]
    event: EventRow,
    creator_username: String,
    booth_count: i64,
}

#[derive(Debug, FromRow)]
struct BoothRow {
    id: Uuid,
    event_id: Uuid,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    name: String,
    color: Option<String>,
    created_at: DateTime<Utc>,
}

impl From<BoothRow> for Booth {
    fn from(row: BoothRow) -> Self {
        Self {
            id: BoothId(row.id),
            event_id: EventId(row.event_id),
            x: row.x,
            y: row.y,
            width: row.width,
            height: row.height,
            name: row.name,
            color: row.color,
            created_at: row.created_at,
        }
    }
}

/// `PostgreSQL`-backed [`FloorPlanStore`].
///
/// # Example
///
/// ```no_run
/// use boothmap_postgres::PostgresFloorPlanStore;
/// use sqlx::PgPool;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PgPool::connect("postgres://localhost/boothmap").await?;
/// let store = PostgresFloorPlanStore::new(pool);
/// store.migrate().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct PostgresFloorPlanStore {
    pool: PgPool,
}

impl PostgresFloorPlanStore {
    /// Create a store over `pool`.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Run database migrations.
    ///
    /// # Errors
    ///
    /// Returns error if migrations fail.
    pub async fn migrate(&self) -> Result<(), StoreError> {
        crate::migrate(&self.pool).await
    }

    async fn insert_event_row(&self, event: NewEvent) -> Result<EventWithCreatorRow, StoreError> {
        sqlx::query_as::<_, EventWithCreatorRow>(
            r"
            WITH inserted AS (
                INSERT INTO events (id, name, description, created_by)
                VALUES ($1, $2, $3, $4)
                RETURNING id, name, description, created_by, created_at
            )
            SELECT i.id, i.name, i.description, i.created_by, i.created_at,
                   u.username AS creator_username
            FROM inserted i
            JOIN users u ON u.id = i.created_by
            ",
        )
        .bind(Uuid::new_v4())
        .bind(&event.name)
        .bind(&event.description)
        .bind(event.created_by.0)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to insert event"))
    }
}

async fn update_booth_in_event(
    conn: &mut sqlx::PgConnection,
    id: BoothId,
    event_id: EventId,
    patch: &BoothPatch,
) -> Result<Option<BoothRow>, StoreError> {
    sqlx::query_as::<_, BoothRow>(
        r"
        UPDATE booths b
        SET x      = COALESCE($3, b.x),
            y      = COALESCE($4, b.y),
            width  = COALESCE($5, b.width),
            height = COALESCE($6, b.height),
            name   = COALESCE($7, b.name),
            color  = COALESCE($8, b.color)
        WHERE b.id = $1 AND b.event_id = $2
        RETURNING b.id, b.event_id, b.x, b.y, b.width, b.height, b.name, b.color, b.created_at
        ",
    )
    .bind(id.0)
    .bind(event_id.0)
    .bind(patch.x)
    .bind(patch.y)
    .bind(patch.width)
    .bind(patch.height)
    .bind(&patch.name)
    .bind(&patch.color)
    .fetch_optional(conn)
    .await
    .map_err(|e| map_db_error(e, "Failed to update booth"))
}

impl FloorPlanStore for PostgresFloorPlanStore {
    async fn list_events(&self, created_by: Option<UserId>) -> Result<Vec<EventSummary>, StoreError> {
        let rows = sqlx::query_as::<_, EventListingRow>(
            r"
            SELECT e.id, e.name, e.description, e.created_by, e.created_at,
                   u.username AS creator_username,
                   (SELECT COUNT(*) FROM booths b WHERE b.event_id = e.id) AS booth_count
            FROM events e
            JOIN users u ON u.id = e.created_by
            WHERE $1::uuid IS NULL OR e.created_by = $1
            ORDER BY e.created_at DESC, e.seq DESC
            ",
        )
        .bind(created_by.map(|id| id.0))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to list events"))?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let creator = created_by.is_none().then(|| Creator {
                    id: UserId(row.event.created_by),
                    username: row.creator_username,
                });
                EventSummary {
                    event: row.event.into(),
                    creator,
                    count: EventCounts {
                        booths: u64::try_from(row.booth_count).unwrap_or_default(),
                    },
                }
            })
            .collect())
    }

    async fn find_event(&self, id: EventId) -> Result<Option<EventDetail>, StoreError> {
        // One snapshot for the event and its booths.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Failed to begin transaction"))?;
        sqlx::query("SET TRANSACTION ISOLATION LEVEL REPEATABLE READ READ ONLY")
            .execute(&mut *tx)
            .await
            .map_err(|e| map_db_error(e, "Failed to set isolation level"))?;

        let Some(row) = sqlx::query_as::<_, EventWithCreatorRow>(
            r"
            SELECT e.id, e.name, e.description, e.created_by, e.created_at,
                   u.username AS creator_username
            FROM events e
            JOIN users u ON u.id = e.created_by
            WHERE e.id = $1
            ",
        )
        .bind(id.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to load event"))?
        else {
            return Ok(None);
        };

        let booths = sqlx::query_as::<_, BoothRow>(&format!(
            "SELECT {BOOTH_COLUMNS} FROM booths b WHERE b.event_id = $1 ORDER BY b.created_at, b.seq"
        ))
        .bind(id.0)
        .fetch_all(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to load booths"))?;

        tx.commit()
            .await
            .map_err(|e| map_db_error(e, "Failed to commit transaction"))?;

        let EventWithCreator { event, creator } = row.into();
        Ok(Some(EventDetail {
            event,
            creator,
            booths: booths.into_iter().map(Booth::from).collect(),
        }))
    }

    async fn insert_event(&self, event: NewEvent) -> Result<EventWithCreator, StoreError> {
        let row = self.insert_event_row(event).await?;
        tracing::debug!(event_id = %row.event.id, "Inserted event");
        Ok(row.into())
    }

    async fn update_event(
        &self,
        id: EventId,
        owner: UserId,
        patch: EventPatch,
    ) -> Result<EventWithCreator, StoreError> {
        let row = sqlx::query_as::<_, EventWithCreatorRow>(
            r"
            WITH updated AS (
                UPDATE events
                SET name        = COALESCE($3, name),
                    description = COALESCE($4, description)
                WHERE id = $1 AND created_by = $2
                RETURNING id, name, description, created_by, created_at
            )
            SELECT d.id, d.name, d.description, d.created_by, d.created_at,
                   u.username AS creator_username
            FROM updated d
            JOIN users u ON u.id = d.created_by
            ",
        )
        .bind(id.0)
        .bind(owner.0)
        .bind(&patch.name)
        .bind(&patch.description)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to update event"))?
        .ok_or(StoreError::NotOwned)?;

        Ok(row.into())
    }

    async fn delete_event(&self, id: EventId, owner: UserId) -> Result<Event, StoreError> {
        let row = sqlx::query_as::<_, EventRow>(
            r"
            DELETE FROM events
            WHERE id = $1 AND created_by = $2
            RETURNING id, name, description, created_by, created_at
            ",
        )
        .bind(id.0)
        .bind(owner.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to delete event"))?
        .ok_or(StoreError::NotOwned)?;

        Ok(row.into())
    }

    async fn list_booths(&self, event_id: EventId) -> Result<Vec<Booth>, StoreError> {
        let rows = sqlx::query_as::<_, BoothRow>(&format!(
            "SELECT {BOOTH_COLUMNS} FROM booths b WHERE b.event_id = $1 ORDER BY b.created_at, b.seq"
        ))
        .bind(event_id.0)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to list booths"))?;

        Ok(rows.into_iter().map(Booth::from).collect())
    }

    async fn insert_booth(&self, owner: UserId, booth: NewBooth) -> Result<Booth, StoreError> {
        let row = sqlx::query_as::<_, BoothRow>(
            r"
            INSERT INTO booths (id, event_id, x, y, width, height, name, color)
            SELECT $1, e.id, $4, $5, $6, $7, $8, $9
            FROM events e
            WHERE e.id = $2 AND e.created_by = $3
            RETURNING id, event_id, x, y, width, height, name, color, created_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(booth.event_id.0)
        .bind(owner.0)
        .bind(booth.x)
        .bind(booth.y)
        .bind(booth.width)
        .bind(booth.height)
        .bind(&booth.name)
        .bind(&booth.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to insert booth"))?
        .ok_or(StoreError::NotOwned)?;

        Ok(row.into())
    }

    async fn update_booth(
        &self,
        id: BoothId,
        owner: UserId,
        patch: BoothPatch,
    ) -> Result<Booth, StoreError> {
        let row = sqlx::query_as::<_, BoothRow>(
            r"
            UPDATE booths b
            SET x      = COALESCE($3, b.x),
                y      = COALESCE($4, b.y),
                width  = COALESCE($5, b.width),
                height = COALESCE($6, b.height),
                name   = COALESCE($7, b.name),
                color  = COALESCE($8, b.color)
            FROM events e
            WHERE b.id = $1 AND e.id = b.event_id AND e.created_by = $2
            RETURNING b.id, b.event_id, b.x, b.y, b.width, b.height, b.name, b.color, b.created_at
            ",
        )
        .bind(id.0)
        .bind(owner.0)
        .bind(patch.x)
        .bind(patch.y)
        .bind(patch.width)
        .bind(patch.height)
        .bind(&patch.name)
        .bind(&patch.color)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to update booth"))?
        .ok_or(StoreError::NotOwned)?;

        Ok(row.into())
    }

    async fn delete_booth(&self, id: BoothId, owner: UserId) -> Result<Booth, StoreError> {
        let row = sqlx::query_as::<_, BoothRow>(
            r"
            DELETE FROM booths b
            USING events e
            WHERE b.id = $1 AND e.id = b.event_id AND e.created_by = $2
            RETURNING b.id, b.event_id, b.x, b.y, b.width, b.height, b.name, b.color, b.created_at
            ",
        )
        .bind(id.0)
        .bind(owner.0)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_db_error(e, "Failed to delete booth"))?
        .ok_or(StoreError::NotOwned)?;

        Ok(row.into())
    }

    async fn update_booths(
        &self,
        event_id: EventId,
        owner: UserId,
        updates: Vec<BoothBatchUpdate>,
    ) -> Result<Vec<Booth>, StoreError> {
        // Dropping `tx` without commit rolls the whole batch back.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| map_db_error(e, "Failed to begin transaction"))?;

        // FOR SHARE blocks a concurrent delete of the event until commit.
        let owned: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM events WHERE id = $1 AND created_by = $2 FOR SHARE",
        )
        .bind(event_id.0)
        .bind(owner.0)
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| map_db_error(e, "Failed to lock event"))?;
        if owned.is_none() {
            return Err(StoreError::NotOwned);
        }

        let mut booths = Vec::with_capacity(updates.len());
        for update in &updates {
            let row = update_booth_in_event(&mut *tx, update.id, event_id, &update.patch)
                .await?
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "Booth {} not found in event {event_id}",
                        update.id
                    ))
                })?;
            booths.push(Booth::from(row));
        }

        tx.commit()
            .await
            .map_err(|e| map_db_error(e, "Failed to commit booth batch"))?;

        tracing::debug!(event_id = %event_id, count = booths.len(), "Booth batch committed");
        Ok(booths)
    }
}

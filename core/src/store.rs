//! Persistence gateway for events and booths.
//!
//! The [`FloorPlanStore`] trait is the only way routers touch persisted data.
//!
//! # Ownership
//!
//! Every write that requires ownership takes the caller's [`UserId`] as
//! `owner` and performs the check and the write as a single atomic unit.
//! A target that does not exist and a target owned by someone else both yield
//! [`StoreError::NotOwned`], so a caller cannot probe for foreign IDs.
//!
//! # Implementations
//!
//! - `PostgresFloorPlanStore` (in `boothmap-postgres`): production
//! - `InMemoryFloorPlanStore` (in `boothmap-testing`): fast, deterministic tests
//!
//! # Example
//!
//! ```no_run
//! use boothmap_core::error::StoreError;
//! use boothmap_core::model::NewEvent;
//! use boothmap_core::store::FloorPlanStore;
//! use boothmap_core::types::UserId;
//!
//! async fn example<S: FloorPlanStore>(store: &S, owner: UserId) -> Result<(), StoreError> {
//!     let created = store
//!         .insert_event(NewEvent {
//!             name: "Spring Fair".to_string(),
//!             description: None,
//!             created_by: owner,
//!         })
//!         .await?;
//!
//!     let booths = store.list_booths(created.event.id).await?;
//!     assert!(booths.is_empty());
//!     Ok(())
//! }
//! ```

use crate::error::StoreError;
use crate::model::{
    Booth, BoothBatchUpdate, BoothPatch, Event, EventDetail, EventPatch, EventSummary,
    EventWithCreator, NewBooth, NewEvent,
};
use crate::types::{BoothId, EventId, UserId};
use std::future::Future;

/// Persistence gateway for events and their booths.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one instance serves every
/// concurrent request.
pub trait FloorPlanStore: Send + Sync {
    /// List events, newest first, each with its booth count.
    ///
    /// With `created_by = None` every event is returned together with its
    /// creator projection. With `Some(user)` only that user's events are
    /// returned and `creator` is left empty.
    ///
    /// # Errors
    ///
    /// Returns `Database` on backend failure.
    fn list_events(
        &self,
        created_by: Option<UserId>,
    ) -> impl Future<Output = Result<Vec<EventSummary>, StoreError>> + Send;

    /// Load one event with its creator and all booths (oldest first).
    ///
    /// # Errors
    ///
    /// Returns `Database` on backend failure.
    fn find_event(
        &self,
        id: EventId,
    ) -> impl Future<Output = Result<Option<EventDetail>, StoreError>> + Send;

    /// Insert an event owned by `event.created_by`.
    ///
    /// # Errors
    ///
    /// Returns `Constraint` if the owner does not exist, `Database` on backend failure.
    fn insert_event(
        &self,
        event: NewEvent,
    ) -> impl Future<Output = Result<EventWithCreator, StoreError>> + Send;

    /// Apply `patch` to an event owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotOwned` if the event is missing or owned by someone else.
    fn update_event(
        &self,
        id: EventId,
        owner: UserId,
        patch: EventPatch,
    ) -> impl Future<Output = Result<EventWithCreator, StoreError>> + Send;

    /// Delete an event owned by `owner`, cascading to its booths.
    ///
    /// # Errors
    ///
    /// Returns `NotOwned` if the event is missing or owned by someone else.
    fn delete_event(
        &self,
        id: EventId,
        owner: UserId,
    ) -> impl Future<Output = Result<Event, StoreError>> + Send;

    /// All booths of an event, oldest first. Unknown events yield an empty list.
    ///
    /// # Errors
    ///
    /// Returns `Database` on backend failure.
    fn list_booths(
        &self,
        event_id: EventId,
    ) -> impl Future<Output = Result<Vec<Booth>, StoreError>> + Send;

    /// Insert a booth into an event owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotOwned` if the parent event is missing or owned by someone else.
    fn insert_booth(
        &self,
        owner: UserId,
        booth: NewBooth,
    ) -> impl Future<Output = Result<Booth, StoreError>> + Send;

    /// Apply `patch` to a booth whose parent event is owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotOwned` if the booth is missing or its event is owned by someone else.
    fn update_booth(
        &self,
        id: BoothId,
        owner: UserId,
        patch: BoothPatch,
    ) -> impl Future<Output = Result<Booth, StoreError>> + Send;

    /// Delete a booth whose parent event is owned by `owner`.
    ///
    /// # Errors
    ///
    /// Returns `NotOwned` if the booth is missing or its event is owned by someone else.
    fn delete_booth(
        &self,
        id: BoothId,
        owner: UserId,
    ) -> impl Future<Output = Result<Booth, StoreError>> + Send;

    /// Apply every update in `updates`, in order, as one transaction.
    ///
    /// Every booth must belong to `event_id`, and `event_id` must be owned by
    /// `owner`. Either all updates are applied or none are.
    ///
    /// # Errors
    ///
    /// - `NotOwned` if the event is missing or owned by someone else
    /// - `NotFound` if a booth is missing or belongs to another event
    fn update_booths(
        &self,
        event_id: EventId,
        owner: UserId,
        updates: Vec<BoothBatchUpdate>,
    ) -> impl Future<Output = Result<Vec<Booth>, StoreError>> + Send;
}

//! `event.*` procedures.

use crate::respond;
use boothmap_core::error::{ProcedureError, Result};
use boothmap_core::input::{CreateEventInput, EventIdInput, UpdateEventInput, parse_input};
use boothmap_core::model::{Event, EventDetail, EventSummary, EventWithCreator, NewEvent};
use boothmap_core::procedure::Caller;
use boothmap_core::store::FloorPlanStore;
use serde_json::Value;
use std::sync::Arc;

const UPDATE_FORBIDDEN: &str = "You can only update your own events";
const DELETE_FORBIDDEN: &str = "You can only delete your own events";

/// Handlers for the `event` namespace.
pub struct EventRouter<S> {
    store: Arc<S>,
}

impl<S> Clone for EventRouter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: FloorPlanStore> EventRouter<S> {
    /// Create a router over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `event.getAll`: every event with creator and booth count, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Internal` on store failure.
    pub async fn get_all(&self) -> Result<Vec<EventSummary>> {
        Ok(self.store.list_events(None).await?)
    }

    /// `event.getMy`: the caller's events with booth count, newest first.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for an anonymous caller, `Internal` on store failure.
    pub async fn get_my(&self, caller: Caller<'_>) -> Result<Vec<EventSummary>> {
        let user = caller.user()?;
        Ok(self.store.list_events(Some(user.id)).await?)
    }

    /// `event.getById`: one event with creator and booths.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if the event does not exist.
    pub async fn get_by_id(&self, input: EventIdInput) -> Result<EventDetail> {
        let found = match input.id.resolve() {
            Some(id) => self.store.find_event(id).await?,
            None => None,
        };
        found.ok_or_else(|| ProcedureError::not_found("Event not found"))
    }

    /// `event.create`: owned by the caller regardless of input.
    ///
    /// # Errors
    ///
    /// Returns `Unauthorized` for an anonymous caller, `Internal` on store failure.
    pub async fn create(&self, caller: Caller<'_>, input: CreateEventInput) -> Result<EventWithCreator> {
        let user = caller.user()?;
        let created = self
            .store
            .insert_event(NewEvent {
                name: input.name,
                description: input.description,
                created_by: user.id,
            })
            .await?;

        tracing::info!(
            event_id = %created.event.id,
            user_id = %user.id,
            "Event created"
        );
        Ok(created)
    }

    /// `event.update`: partial update of an owned event.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the event is missing or not owned by the caller.
    pub async fn update(&self, caller: Caller<'_>, input: UpdateEventInput) -> Result<EventWithCreator> {
        let user = caller.user()?;
        let (id, patch) = input.into_parts();
        let id = id
            .resolve()
            .ok_or_else(|| ProcedureError::forbidden(UPDATE_FORBIDDEN))?;
        let updated = self
            .store
            .update_event(id, user.id, patch)
            .await
            .map_err(|e| ProcedureError::from(e).ownership_message(UPDATE_FORBIDDEN))?;

        tracing::info!(event_id = %id, user_id = %user.id, "Event updated");
        Ok(updated)
    }

    /// `event.delete`: removes an owned event and its booths.
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the event is missing or not owned by the caller.
    pub async fn delete(&self, caller: Caller<'_>, input: EventIdInput) -> Result<Event> {
        let user = caller.user()?;
        let id = input
            .id
            .resolve()
            .ok_or_else(|| ProcedureError::forbidden(DELETE_FORBIDDEN))?;
        let deleted = self
            .store
            .delete_event(id, user.id)
            .await
            .map_err(|e| ProcedureError::from(e).ownership_message(DELETE_FORBIDDEN))?;

        tracing::info!(event_id = %deleted.id, user_id = %user.id, "Event deleted");
        Ok(deleted)
    }

    pub(crate) async fn dispatch(
        &self,
        operation: &str,
        caller: Caller<'_>,
        input: Option<Value>,
    ) -> Result<Value> {
        match operation {
            "getAll" => respond(&self.get_all().await?),
            "getMy" => respond(&self.get_my(caller).await?),
            "getById" => respond(&self.get_by_id(parse_input(input)?).await?),
            "create" => respond(&self.create(caller, parse_input(input)?).await?),
            "update" => respond(&self.update(caller, parse_input(input)?).await?),
            "delete" => respond(&self.delete(caller, parse_input(input)?).await?),
            other => Err(ProcedureError::not_found(format!(
                "No procedure \"event.{other}\""
            ))),
        }
    }
}

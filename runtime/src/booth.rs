//! `booth.*` procedures.
//!
//! Every write is ownership-gated on the parent event. The gateway performs
//! the check and the write together, so a booth cannot change hands between
//! the two.

use crate::respond;
use boothmap_core::error::{ProcedureError, Result};
use boothmap_core::input::{
    BoothIdInput, BoothPositionInput, BoothsByEventInput, CreateBoothInput, UpdateBoothInput,
    UpdateManyBoothsInput, parse_input,
};
use boothmap_core::model::{Booth, BoothBatchUpdate};
use boothmap_core::procedure::Caller;
use boothmap_core::store::FloorPlanStore;
use serde_json::Value;
use std::sync::Arc;

const CREATE_FORBIDDEN: &str = "You can only add booths to your own events";
const UPDATE_FORBIDDEN: &str = "You can only update booths in your own events";
const DELETE_FORBIDDEN: &str = "You can only delete booths in your own events";

/// Handlers for the `booth` namespace.
pub struct BoothRouter<S> {
    store: Arc<S>,
}

impl<S> Clone for BoothRouter<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: FloorPlanStore> BoothRouter<S> {
    /// Create a router over `store`.
    #[must_use]
    pub const fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// `booth.getByEventId`: booths of an event, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Internal` on store failure.
    pub async fn get_by_event_id(&self, input: BoothsByEventInput) -> Result<Vec<Booth>> {
        match input.event_id.resolve() {
            Some(event_id) => Ok(self.store.list_booths(event_id).await?),
            None => Ok(Vec::new()),
        }
    }

    /// `booth.create`
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the parent event is missing or not owned by the caller.
    pub async fn create(&self, caller: Caller<'_>, input: CreateBoothInput) -> Result<Booth> {
        let user = caller.user()?;
        let booth = input
            .into_new_booth()
            .ok_or_else(|| ProcedureError::forbidden(CREATE_FORBIDDEN))?;
        let booth = self
            .store
            .insert_booth(user.id, booth)
            .await
            .map_err(|e| ProcedureError::from(e).ownership_message(CREATE_FORBIDDEN))?;

        tracing::info!(
            booth_id = %booth.id,
            event_id = %booth.event_id,
            user_id = %user.id,
            "Booth created"
        );
        Ok(booth)
    }

    /// `booth.update`
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the booth is missing or its event is not owned by the caller.
    pub async fn update(&self, caller: Caller<'_>, input: UpdateBoothInput) -> Result<Booth> {
        let user = caller.user()?;
        let (id, patch) = input.into_parts();
        let id = id
            .resolve()
            .ok_or_else(|| ProcedureError::forbidden(UPDATE_FORBIDDEN))?;
        let booth = self
            .store
            .update_booth(id, user.id, patch)
            .await
            .map_err(|e| ProcedureError::from(e).ownership_message(UPDATE_FORBIDDEN))?;

        tracing::debug!(booth_id = %id, user_id = %user.id, "Booth updated");
        Ok(booth)
    }

    /// `booth.delete`
    ///
    /// # Errors
    ///
    /// Returns `Forbidden` if the booth is missing or its event is not owned by the caller.
    pub async fn delete(&self, caller: Caller<'_>, input: BoothIdInput) -> Result<Booth> {
        let user = caller.user()?;
        let id = input
            .id
            .resolve()
            .ok_or_else(|| ProcedureError::forbidden(DELETE_FORBIDDEN))?;
        let booth = self
            .store
            .delete_booth(id, user.id)
            .await
            .map_err(|e| ProcedureError::from(e).ownership_message(DELETE_FORBIDDEN))?;

        tracing::info!(booth_id = %booth.id, user_id = %user.id, "Booth deleted");
        Ok(booth)
    }

    /// `booth.updateMany`: one ownership check, then every update atomically.
    ///
    /// Results are returned in request order.
    ///
    /// # Errors
    ///
    /// - `Forbidden` if the event is missing or not owned by the caller
    /// - `NotFound` if any booth is missing or belongs to another event
    pub async fn update_many(
        &self,
        caller: Caller<'_>,
        input: UpdateManyBoothsInput,
    ) -> Result<Vec<Booth>> {
        let user = caller.user()?;
        let event_id = input
            .event_id
            .resolve()
            .ok_or_else(|| ProcedureError::forbidden(UPDATE_FORBIDDEN))?;
        let count = input.booths.len();

        let unknown = input.booths.iter().find(|b| b.id.resolve().is_none());
        if let Some(entry) = unknown {
            // read-only path: nothing is written
            let owned = self
                .store
                .find_event(event_id)
                .await?
                .is_some_and(|detail| detail.event.created_by == user.id);
            return Err(if owned {
                ProcedureError::not_found(format!(
                    "Booth {} not found in event {event_id}",
                    entry.id
                ))
            } else {
                ProcedureError::forbidden(UPDATE_FORBIDDEN)
            });
        }

        let updates: Vec<BoothBatchUpdate> = input
            .booths
            .into_iter()
            .filter_map(BoothPositionInput::into_update)
            .collect();
        let booths = self
            .store
            .update_booths(event_id, user.id, updates)
            .await
            .map_err(|e| ProcedureError::from(e).ownership_message(UPDATE_FORBIDDEN))?;

        tracing::debug!(
            event_id = %event_id,
            user_id = %user.id,
            count,
            "Booths updated"
        );
        Ok(booths)
    }

    pub(crate) async fn dispatch(
        &self,
        operation: &str,
        caller: Caller<'_>,
        input: Option<Value>,
    ) -> Result<Value> {
        match operation {
            "getByEventId" => respond(&self.get_by_event_id(parse_input(input)?).await?),
            "create" => respond(&self.create(caller, parse_input(input)?).await?),
            "update" => respond(&self.update(caller, parse_input(input)?).await?),
            "delete" => respond(&self.delete(caller, parse_input(input)?).await?),
            "updateMany" => respond(&self.update_many(caller, parse_input(input)?).await?),
            other => Err(ProcedureError::not_found(format!(
                "No procedure \"booth.{other}\""
            ))),
        }
    }
}

//! In-memory floor plan store.
//!
//! [`InMemoryFloorPlanStore`] implements the full [`FloorPlanStore`] contract
//! over plain vectors, including owner-guarded writes, cascading deletes and
//! all-or-nothing batch updates. Insertion order doubles as creation order,
//! so results stay deterministic under a [`FixedClock`](crate::mocks::FixedClock).

use boothmap_core::environment::Clock;
use boothmap_core::error::StoreError;
use boothmap_core::input::MIN_BOOTH_SIZE;
use boothmap_core::model::{
    Booth, BoothBatchUpdate, BoothPatch, Creator, Event, EventCounts, EventDetail, EventPatch,
    EventSummary, EventWithCreator, NewBooth, NewEvent, User,
};
use boothmap_core::store::FloorPlanStore;
use boothmap_core::types::{BoothId, EventId, UserId};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Clone, Default)]
struct State {
    users: HashMap<UserId, User>,
    events: Vec<Event>,
    booths: Vec<Booth>,
}

impl State {
    fn creator(&self, id: UserId) -> Result<Creator, StoreError> {
        self.users
            .get(&id)
            .map(|user| Creator {
                id: user.id,
                username: user.username.clone(),
            })
            .ok_or_else(|| StoreError::Database(format!("dangling creator {id}")))
    }

    fn owned_event(&self, id: EventId, owner: UserId) -> Result<usize, StoreError> {
        self.events
            .iter()
            .position(|e| e.id == id && e.created_by == owner)
            .ok_or(StoreError::NotOwned)
    }

    fn owned_booth(&self, id: BoothId, owner: UserId) -> Result<usize, StoreError> {
        let index = self
            .booths
            .iter()
            .position(|b| b.id == id)
            .ok_or(StoreError::NotOwned)?;
        self.owned_event(self.booths[index].event_id, owner)?;
        Ok(index)
    }

    fn booth_count(&self, event_id: EventId) -> u64 {
        self.booths.iter().filter(|b| b.event_id == event_id).count() as u64
    }
}

fn check_geometry(booth: &Booth) -> Result<(), StoreError> {
    if booth.x < 0.0 || booth.y < 0.0 {
        return Err(StoreError::Constraint("booth coordinates must be >= 0".into()));
    }
    if booth.width < MIN_BOOTH_SIZE || booth.height < MIN_BOOTH_SIZE {
        return Err(StoreError::Constraint(format!(
            "booth dimensions must be >= {MIN_BOOTH_SIZE}"
        )));
    }
    Ok(())
}

/// In-memory [`FloorPlanStore`] for fast, deterministic tests.
///
/// Users are not managed by the procedure API; seed them with
/// [`add_user`](Self::add_user) before inserting events.
///
/// # Example
///
/// ```
/// use boothmap_testing::{InMemoryFloorPlanStore, fixtures};
/// use boothmap_core::model::NewEvent;
/// use boothmap_core::store::FloorPlanStore;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let store = InMemoryFloorPlanStore::new();
/// let alice = store.add_user(fixtures::organizer("alice"));
///
/// let created = store
///     .insert_event(NewEvent {
///         name: "Spring Fair".into(),
///         description: None,
///         created_by: alice.id,
///     })
///     .await?;
/// assert_eq!(created.creator.username, "alice");
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct InMemoryFloorPlanStore {
    state: Arc<RwLock<State>>,
    clock: Arc<dyn Clock>,
}

impl InMemoryFloorPlanStore {
    /// Create an empty store stamped by [`test_clock`](crate::mocks::test_clock).
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(crate::mocks::test_clock())
    }

    /// Create an empty store stamped by `clock`.
    #[must_use]
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            state: Arc::new(RwLock::new(State::default())),
            clock: Arc::new(clock),
        }
    }

    /// Seed a user. Returns the user for convenience.
    ///
    /// A poisoned lock leaves the store unchanged.
    pub fn add_user(&self, user: User) -> User {
        if let Ok(mut state) = self.state.write() {
            state.users.insert(user.id, user.clone());
        }
        user
    }

    /// Number of stored events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.state.read().map_or(0, |s| s.events.len())
    }

    /// Number of stored booths across all events.
    #[must_use]
    pub fn booth_count(&self) -> usize {
        self.state.read().map_or(0, |s| s.booths.len())
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, StoreError> {
        self.state
            .read()
            .map_err(|e| StoreError::Database(format!("lock poisoned: {e}")))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, StoreError> {
        self.state
            .write()
            .map_err(|e| StoreError::Database(format!("lock poisoned: {e}")))
    }
}

impl Default for InMemoryFloorPlanStore {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for InMemoryFloorPlanStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InMemoryFloorPlanStore")
            .field("events", &self.event_count())
            .field("booths", &self.booth_count())
            .finish_non_exhaustive()
    }
}

impl FloorPlanStore for InMemoryFloorPlanStore {
    async fn list_events(&self, created_by: Option<UserId>) -> Result<Vec<EventSummary>, StoreError> {
        let state = self.read()?;
        state
            .events
            .iter()
            .rev()
            .filter(|e| created_by.is_none_or(|owner| e.created_by == owner))
            .map(|event| -> Result<EventSummary, StoreError> {
                let creator = match created_by {
                    Some(_) => None,
                    None => Some(state.creator(event.created_by)?),
                };
                Ok(EventSummary {
                    event: event.clone(),
                    creator,
                    count: EventCounts {
                        booths: state.booth_count(event.id),
                    },
                })
            })
            .collect()
    }

    async fn find_event(&self, id: EventId) -> Result<Option<EventDetail>, StoreError> {
        let state = self.read()?;
        let Some(event) = state.events.iter().find(|e| e.id == id) else {
            return Ok(None);
        };
        Ok(Some(EventDetail {
            event: event.clone(),
            creator: state.creator(event.created_by)?,
            booths: state
                .booths
                .iter()
                .filter(|b| b.event_id == id)
                .cloned()
                .collect(),
        }))
    }

    async fn insert_event(&self, event: NewEvent) -> Result<EventWithCreator, StoreError> {
        let mut state = self.write()?;
        if !state.users.contains_key(&event.created_by) {
            return Err(StoreError::Constraint(format!(
                "unknown user {}",
                event.created_by
            )));
        }
        let event = Event {
            id: EventId::new(),
            name: event.name,
            description: event.description,
            created_by: event.created_by,
            created_at: self.clock.now(),
        };
        state.events.push(event.clone());
        let creator = state.creator(event.created_by)?;
        Ok(EventWithCreator { event, creator })
    }

    async fn update_event(
        &self,
        id: EventId,
        owner: UserId,
        patch: EventPatch,
    ) -> Result<EventWithCreator, StoreError> {
        let mut state = self.write()?;
        let index = state.owned_event(id, owner)?;
        let event = &mut state.events[index];
        if let Some(name) = patch.name {
            event.name = name;
        }
        if let Some(description) = patch.description {
            event.description = Some(description);
        }
        let event = event.clone();
        let creator = state.creator(event.created_by)?;
        Ok(EventWithCreator { event, creator })
    }

    async fn delete_event(&self, id: EventId, owner: UserId) -> Result<Event, StoreError> {
        let mut state = self.write()?;
        let index = state.owned_event(id, owner)?;
        let event = state.events.remove(index);
        state.booths.retain(|b| b.event_id != id);
        Ok(event)
    }

    async fn list_booths(&self, event_id: EventId) -> Result<Vec<Booth>, StoreError> {
        let state = self.read()?;
        Ok(state
            .booths
            .iter()
            .filter(|b| b.event_id == event_id)
            .cloned()
            .collect())
    }

    async fn insert_booth(&self, owner: UserId, booth: NewBooth) -> Result<Booth, StoreError> {
        let mut state = self.write()?;
        state.owned_event(booth.event_id, owner)?;
        let booth = Booth {
            id: BoothId::new(),
            event_id: booth.event_id,
            x: booth.x,
            y: booth.y,
            width: booth.width,
            height: booth.height,
            name: booth.name,
            color: booth.color,
            created_at: self.clock.now(),
        };
        check_geometry(&booth)?;
        state.booths.push(booth.clone());
        Ok(booth)
    }

    async fn update_booth(
        &self,
        id: BoothId,
        owner: UserId,
        patch: BoothPatch,
    ) -> Result<Booth, StoreError> {
        let mut state = self.write()?;
        let index = state.owned_booth(id, owner)?;
        let mut updated = state.booths[index].clone();
        patch.apply_to(&mut updated);
        check_geometry(&updated)?;
        state.booths[index] = updated.clone();
        Ok(updated)
    }

    async fn delete_booth(&self, id: BoothId, owner: UserId) -> Result<Booth, StoreError> {
        let mut state = self.write()?;
        let index = state.owned_booth(id, owner)?;
        Ok(state.booths.remove(index))
    }

    async fn update_booths(
        &self,
        event_id: EventId,
        owner: UserId,
        updates: Vec<BoothBatchUpdate>,
    ) -> Result<Vec<Booth>, StoreError> {
        let mut state = self.write()?;
        state.owned_event(event_id, owner)?;

        // Stage on a copy; the live vector is only replaced once every update succeeded.
        let mut staged = state.booths.clone();
        let mut results = Vec::with_capacity(updates.len());
        for update in updates {
            let booth = staged
                .iter_mut()
                .find(|b| b.id == update.id && b.event_id == event_id)
                .ok_or_else(|| {
                    StoreError::NotFound(format!(
                        "Booth {} not found in event {event_id}",
                        update.id
                    ))
                })?;
            update.patch.apply_to(booth);
            check_geometry(booth)?;
            results.push(booth.clone());
        }
        state.booths = staged;
        Ok(results)
    }
}

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{AccountStore, BookingFilter, EventFilter, EventStore, Include, StoreError};
use crate::models::{Booking, Credentials, Event, EventChanges, EventRecord, User};

#[derive(Default)]
struct MemoryState {
    // Insertion order is the store order for listings.
    events: Vec<Event>,
    users: HashMap<Uuid, User>,
    password_hashes: HashMap<Uuid, String>,
    bookings: Vec<Booking>,
    sessions: HashMap<Uuid, (Uuid, DateTime<Utc>)>,
}

/// In-process binding of the persistence gateway, used by tests and local
/// runs without a database.
#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<MemoryState>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a booking against an event, which locks it.
    pub async fn insert_booking(&self, booking: Booking) {
        self.state.write().await.bookings.push(booking);
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, event: Event) -> Result<Event, StoreError> {
        self.state.write().await.events.push(event.clone());
        Ok(event)
    }

    async fn find_event(
        &self,
        id: Uuid,
        include: Include,
    ) -> Result<Option<EventRecord>, StoreError> {
        let state = self.state.read().await;
        let Some(event) = state.events.iter().find(|event| event.id == id).cloned() else {
            return Ok(None);
        };

        let owner = if include.owner {
            let owner = state
                .users
                .get(&event.event_created_by_id)
                .cloned()
                .ok_or(StoreError::MissingOwner(event.id))?;
            Some(owner)
        } else {
            None
        };

        let bookings = include.bookings.then(|| {
            state
                .bookings
                .iter()
                .filter(|booking| booking.event_id == id)
                .cloned()
                .collect()
        });

        Ok(Some(EventRecord {
            event,
            owner,
            bookings,
        }))
    }

    async fn find_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .events
            .iter()
            .filter(|event| {
                filter
                    .owner_id
                    .map_or(true, |owner| event.event_created_by_id == owner)
            })
            .cloned()
            .collect())
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError> {
        let mut state = self.state.write().await;
        let Some(event) = state.events.iter_mut().find(|event| event.id == id) else {
            return Ok(None);
        };

        changes.apply_to(event);
        Ok(Some(event.clone()))
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError> {
        let mut state = self.state.write().await;
        let before = state.events.len();
        state.events.retain(|event| event.id != id);
        Ok(state.events.len() < before)
    }

    async fn count_bookings(&self, filter: BookingFilter) -> Result<i64, StoreError> {
        let state = self.state.read().await;
        let count = state
            .bookings
            .iter()
            .filter(|booking| filter.event_id.map_or(true, |id| booking.event_id == id))
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl AccountStore for MemoryStore {
    async fn create_user(&self, user: User, password_hash: String) -> Result<User, StoreError> {
        let mut state = self.state.write().await;
        if state.users.values().any(|existing| existing.email == user.email) {
            return Err(StoreError::DuplicateEmail(user.email));
        }

        state.password_hashes.insert(user.id, password_hash);
        state.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .users
            .values()
            .find(|user| user.email == email)
            .and_then(|user| {
                state.password_hashes.get(&user.id).map(|hash| Credentials {
                    user: user.clone(),
                    password_hash: hash.clone(),
                })
            }))
    }

    async fn create_session(
        &self,
        token: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        self.state
            .write()
            .await
            .sessions
            .insert(token, (user_id, expires_at));
        Ok(())
    }

    async fn resolve_session(
        &self,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        let state = self.state.read().await;
        Ok(state
            .sessions
            .get(&token)
            .filter(|(_, expires_at)| *expires_at > now)
            .map(|(user_id, _)| *user_id))
    }
}

//! Persistence gateway for events and the records they relate to.
//!
//! [`EventStore`] is the only way the lifecycle service touches storage. It is
//! kept to create, find-by-id, find-many, update, delete and count so that a
//! new datastore binding only has to provide those six operations.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Credentials, Event, EventChanges, EventRecord, User};

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error")]
    Database(#[from] sqlx::Error),

    #[error("event {0} references an owner that does not exist")]
    MissingOwner(Uuid),

    #[error("a user with email '{0}' already exists")]
    DuplicateEmail(String),
}

/// Relations to load alongside an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Include {
    pub owner: bool,
    pub bookings: bool,
}

impl Include {
    pub const NONE: Include = Include {
        owner: false,
        bookings: false,
    };

    pub const ALL: Include = Include {
        owner: true,
        bookings: true,
    };
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EventFilter {
    pub owner_id: Option<Uuid>,
}

impl EventFilter {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn owned_by(owner_id: Uuid) -> Self {
        Self {
            owner_id: Some(owner_id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BookingFilter {
    pub event_id: Option<Uuid>,
}

impl BookingFilter {
    pub fn for_event(event_id: Uuid) -> Self {
        Self {
            event_id: Some(event_id),
        }
    }
}

#[async_trait]
pub trait EventStore: Send + Sync {
    /// Inserts a new event and returns the stored row.
    async fn create_event(&self, event: Event) -> Result<Event, StoreError>;

    /// Loads one event with the requested relations. `Ok(None)` when absent.
    async fn find_event(&self, id: Uuid, include: Include)
        -> Result<Option<EventRecord>, StoreError>;

    /// Lists events matching `filter` in store order.
    async fn find_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError>;

    /// Applies `changes` to an existing event. `Ok(None)` when absent.
    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError>;

    /// Removes an event. Returns whether a row was deleted.
    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError>;

    async fn count_bookings(&self, filter: BookingFilter) -> Result<i64, StoreError>;
}

/// Users and their login sessions.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Inserts a user with its password hash. Fails with
    /// [`StoreError::DuplicateEmail`] when the email is taken.
    async fn create_user(&self, user: User, password_hash: String) -> Result<User, StoreError>;

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError>;

    async fn create_session(
        &self,
        token: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError>;

    /// Returns the user owning `token` if the session exists and has not
    /// expired at `now`.
    async fn resolve_session(
        &self,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError>;
}

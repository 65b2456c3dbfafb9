//! Event lifecycle: validation, ownership and booking-lock checks around the
//! persistence gateway.
//!
//! Checks short-circuit in a fixed order (validation, existence, lock,
//! ownership), so exactly one error is reported per call. A booked event is
//! reported as locked to every caller.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{BookingStatus, Event, EventDetail, EventPayload, OwnerInfo};
use crate::store::{BookingFilter, EventFilter, EventStore, Include, StoreError};
use crate::validation::{validate_event, ValidationErrors};

/// The kind of mutation refused by an ownership or lock check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    Update,
    Delete,
}

impl Mutation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Mutation::Update => "update",
            Mutation::Delete => "delete",
        }
    }
}

#[derive(Debug, Error)]
pub enum EventError {
    #[error("invalid event payload: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("event {0} does not exist")]
    NotFound(Uuid),

    #[error("user {caller} may not {} event {event_id}", .action.as_str())]
    Unauthorized {
        event_id: Uuid,
        caller: Uuid,
        action: Mutation,
    },

    #[error("cannot {} event {event_id} tied to {bookings} booking(s)", .action.as_str())]
    Locked {
        event_id: Uuid,
        bookings: i64,
        action: Mutation,
    },

    #[error(transparent)]
    Persistence(#[from] StoreError),
}

/// Result of listing a caller's own events.
///
/// An empty list is still a successful result; `is_empty` lets the transport
/// tell the client that nothing was found.
#[derive(Debug, Clone, PartialEq)]
pub struct OwnerEvents {
    pub events: Vec<Event>,
}

impl OwnerEvents {
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

#[derive(Clone)]
pub struct EventService {
    store: Arc<dyn EventStore>,
}

impl EventService {
    pub fn new(store: Arc<dyn EventStore>) -> Self {
        Self { store }
    }

    #[instrument(skip(self, payload))]
    pub async fn create(&self, payload: EventPayload, caller: Uuid) -> Result<Event, EventError> {
        let validated = validate_event(payload, Utc::now())?;
        let event = validated.into_event(Uuid::new_v4(), caller);

        let stored = self.store.create_event(event).await?;
        info!(event_id = %stored.id, "Event created");
        Ok(stored)
    }

    #[instrument(skip(self))]
    pub async fn list_all(&self) -> Result<Vec<Event>, EventError> {
        Ok(self.store.find_events(EventFilter::all()).await?)
    }

    #[instrument(skip(self))]
    pub async fn get_by_id(&self, id: Uuid) -> Result<EventDetail, EventError> {
        let record = self
            .store
            .find_event(id, Include::ALL)
            .await?
            .ok_or(EventError::NotFound(id))?;

        let owner = record.owner.ok_or(StoreError::MissingOwner(id))?;
        let bookings = record.bookings.map_or(0, |bookings| bookings.len());

        Ok(EventDetail {
            owner_info: OwnerInfo::from(owner),
            booking_status: BookingStatus::from_count(bookings),
            event_info: record.event.into(),
        })
    }

    #[instrument(skip(self))]
    pub async fn list_by_owner(&self, caller: Uuid) -> Result<OwnerEvents, EventError> {
        let events = self.store.find_events(EventFilter::owned_by(caller)).await?;
        if events.is_empty() {
            info!("No events found for this user");
        }
        Ok(OwnerEvents { events })
    }

    #[instrument(skip(self, payload))]
    pub async fn update(
        &self,
        id: Uuid,
        payload: EventPayload,
        caller: Uuid,
    ) -> Result<Event, EventError> {
        let validated = validate_event(payload, Utc::now())?;
        self.ensure_mutable(id, caller, Mutation::Update).await?;

        let updated = self
            .store
            .update_event(id, validated.into_changes())
            .await?
            .ok_or(EventError::NotFound(id))?;

        info!(event_id = %id, "Event updated");
        Ok(updated)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, id: Uuid, caller: Uuid) -> Result<(), EventError> {
        self.ensure_mutable(id, caller, Mutation::Delete).await?;

        if !self.store.delete_event(id).await? {
            return Err(EventError::NotFound(id));
        }

        info!(event_id = %id, "Event deleted");
        Ok(())
    }

    /// Existence, booking-lock and ownership checks shared by update and
    /// delete.
    ///
    /// The count is not guarded against a booking inserted between this check
    /// and the write that follows.
    async fn ensure_mutable(
        &self,
        id: Uuid,
        caller: Uuid,
        action: Mutation,
    ) -> Result<(), EventError> {
        let record = self
            .store
            .find_event(id, Include::NONE)
            .await?
            .ok_or(EventError::NotFound(id))?;

        let bookings = self.store.count_bookings(BookingFilter::for_event(id)).await?;
        if bookings > 0 {
            warn!(
                event_id = %id,
                bookings,
                action = action.as_str(),
                "Event is locked by bookings"
            );
            return Err(EventError::Locked {
                event_id: id,
                bookings,
                action,
            });
        }

        if record.event.event_created_by_id != caller {
            warn!(
                event_id = %id,
                %caller,
                action = action.as_str(),
                "Caller does not own event"
            );
            return Err(EventError::Unauthorized {
                event_id: id,
                caller,
                action,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Booking, Coordinates, User};
    use crate::store::{AccountStore, MemoryStore};
    use rust_decimal::Decimal;

    fn payload(title: &str) -> EventPayload {
        EventPayload {
            title: Some(title.to_string()),
            description: Some("desc".to_string()),
            price: Some(Decimal::new(10, 0)),
            location: Some(Coordinates::new(1.0, 1.0)),
            map_data: Some(Coordinates::new(1.0, 1.0)),
            photos: Some(vec!["https://x/a.png".to_string()]),
            created_at: None,
            updated_at: None,
        }
    }

    fn user(id: Uuid) -> User {
        User {
            id,
            email: "owner@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    async fn book(store: &MemoryStore, event_id: Uuid) {
        store
            .insert_booking(Booking {
                id: Uuid::new_v4(),
                event_id,
                user_id: Uuid::new_v4(),
                created_at: Utc::now(),
            })
            .await;
    }

    fn setup() -> (Arc<MemoryStore>, EventService) {
        let store = Arc::new(MemoryStore::new());
        let service = EventService::new(store.clone());
        (store, service)
    }

    #[tokio::test]
    async fn test_create_sets_owner_to_caller() {
        let (_, service) = setup();
        let caller = Uuid::new_v4();

        let event = service.create(payload("Show"), caller).await.unwrap();

        assert_eq!(event.event_created_by_id, caller);
        assert_eq!(event.title, "Show");
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_payload() {
        let (store, service) = setup();
        let bad = EventPayload {
            price: Some(Decimal::new(-5, 0)),
            ..payload("Show")
        };

        let err = service.create(bad, Uuid::new_v4()).await.unwrap_err();

        assert!(matches!(err, EventError::Validation(ref e) if e.has_field("price")));
        assert!(store.find_events(EventFilter::all()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_get_by_id_reports_booking_status() {
        let (store, service) = setup();
        let owner = Uuid::new_v4();
        store.create_user(user(owner), "hash".to_string()).await.unwrap();
        let event = service.create(payload("Show"), owner).await.unwrap();

        let detail = service.get_by_id(event.id).await.unwrap();
        assert_eq!(detail.booking_status, BookingStatus::Available);
        assert_eq!(detail.owner_info.email, "owner@example.com");
        assert_eq!(detail.event_info.id, event.id);

        book(&store, event.id).await;
        let detail = service.get_by_id(event.id).await.unwrap();
        assert_eq!(detail.booking_status, BookingStatus::Booked);
    }

    #[tokio::test]
    async fn test_get_by_id_missing_event() {
        let (_, service) = setup();
        let id = Uuid::new_v4();

        let err = service.get_by_id(id).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_list_by_owner_empty_is_ok() {
        let (_, service) = setup();
        service.create(payload("Other"), Uuid::new_v4()).await.unwrap();

        let owned = service.list_by_owner(Uuid::new_v4()).await.unwrap();
        assert!(owned.is_empty());
    }

    #[tokio::test]
    async fn test_update_by_owner_replaces_fields() {
        let (_, service) = setup();
        let owner = Uuid::new_v4();
        let event = service.create(payload("Show"), owner).await.unwrap();

        let changed = EventPayload {
            description: Some("moved".to_string()),
            price: Some(Decimal::new(25, 0)),
            map_data: Some(Coordinates::new(2.0, 3.0)),
            photos: Some(vec![]),
            ..payload("Matinee")
        };
        let updated = service.update(event.id, changed, owner).await.unwrap();

        assert_eq!(updated.id, event.id);
        assert_eq!(updated.event_created_by_id, owner);
        assert_eq!(updated.created_at, event.created_at);
        assert_eq!(updated.title, "Matinee");
        assert_eq!(updated.description, "moved");
        assert_eq!(updated.price, Decimal::new(25, 0));
        assert_eq!(updated.map_data, Coordinates::new(2.0, 3.0));
        assert!(updated.photos.is_empty());
    }

    #[tokio::test]
    async fn test_update_by_stranger_is_unauthorized() {
        let (_, service) = setup();
        let event = service.create(payload("Show"), Uuid::new_v4()).await.unwrap();

        let err = service
            .update(event.id, payload("Hijack"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EventError::Unauthorized {
                action: Mutation::Update,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let (_, service) = setup();

        let err = service
            .update(Uuid::new_v4(), EventPayload::default(), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Validation(_)));
    }

    #[tokio::test]
    async fn test_booked_event_is_locked_for_owner() {
        let (store, service) = setup();
        let owner = Uuid::new_v4();
        let event = service.create(payload("Show"), owner).await.unwrap();
        book(&store, event.id).await;

        let err = service
            .update(event.id, payload("Changed"), owner)
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::Locked { bookings: 1, .. }));

        let err = service.delete(event.id, owner).await.unwrap_err();
        assert!(matches!(
            err,
            EventError::Locked {
                action: Mutation::Delete,
                ..
            }
        ));
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_booked_event_is_locked_for_strangers_too() {
        let (store, service) = setup();
        let event = service.create(payload("Show"), Uuid::new_v4()).await.unwrap();
        book(&store, event.id).await;

        let err = service
            .update(event.id, payload("Hijack"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            EventError::Locked {
                action: Mutation::Update,
                ..
            }
        ));

        let err = service.delete(event.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            EventError::Locked {
                action: Mutation::Delete,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let (_, service) = setup();
        let id = Uuid::new_v4();

        let err = service
            .update(id, payload("Show"), Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, EventError::NotFound(missing) if missing == id));
    }

    #[tokio::test]
    async fn test_delete_by_stranger_is_unauthorized() {
        let (_, service) = setup();
        let owner = Uuid::new_v4();
        let event = service.create(payload("Show"), owner).await.unwrap();

        let err = service.delete(event.id, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(
            err,
            EventError::Unauthorized {
                action: Mutation::Delete,
                ..
            }
        ));
        assert_eq!(service.list_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_delete_by_owner_removes_event() {
        let (_, service) = setup();
        let owner = Uuid::new_v4();
        let event = service.create(payload("Show"), owner).await.unwrap();

        service.delete(event.id, owner).await.unwrap();

        assert!(service.list_all().await.unwrap().is_empty());
        let err = service.delete(event.id, owner).await.unwrap_err();
        assert!(matches!(err, EventError::NotFound(_)));
    }
}

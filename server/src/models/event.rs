use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{booking::Booking, user::User};

/// A geographic point as sent by clients: `{ "longitude": .., "latitude": .. }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub longitude: f64,
    pub latitude: f64,
}

impl Coordinates {
    pub fn new(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.longitude.is_finite() && self.latitude.is_finite()
    }
}

/// Prices go over the wire as JSON numbers. Whole amounts are written as
/// integers (`10`, not `10.0`) so they read back exactly as they were sent.
mod price {
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal::Decimal;
    use serde::Serializer;

    pub use rust_decimal::serde::float::deserialize;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        match value.fract().is_zero().then(|| value.to_i64()).flatten() {
            Some(whole) => serializer.serialize_i64(whole),
            None => rust_decimal::serde::float::serialize(value, serializer),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(with = "price")]
    pub price: Decimal,
    pub location: Coordinates,
    pub map_data: Coordinates,
    pub photos: Vec<String>,
    pub event_created_by_id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Raw event body as received from a client. Every field is optional here so
/// that missing fields are reported by the validator instead of the decoder.
///
/// `id` and `eventCreatedById` are accepted but never read.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(default, with = "rust_decimal::serde::float_option")]
    pub price: Option<Decimal>,
    pub location: Option<Coordinates>,
    pub map_data: Option<Coordinates>,
    pub photos: Option<Vec<String>>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Event fields that passed validation, with timestamps already defaulted.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedEvent {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub location: Coordinates,
    pub map_data: Coordinates,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ValidatedEvent {
    /// Builds the record to insert. The owner always comes from the caller.
    pub fn into_event(self, id: Uuid, owner_id: Uuid) -> Event {
        Event {
            id,
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            map_data: self.map_data,
            photos: self.photos,
            event_created_by_id: owner_id,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }

    pub fn into_changes(self) -> EventChanges {
        EventChanges {
            title: self.title,
            description: self.description,
            price: self.price,
            location: self.location,
            map_data: self.map_data,
            photos: self.photos,
            updated_at: self.updated_at,
        }
    }
}

/// Columns an update is allowed to touch. `id`, the owner and `createdAt`
/// are not part of it.
#[derive(Debug, Clone, PartialEq)]
pub struct EventChanges {
    pub title: String,
    pub description: String,
    pub price: Decimal,
    pub location: Coordinates,
    pub map_data: Coordinates,
    pub photos: Vec<String>,
    pub updated_at: DateTime<Utc>,
}

impl EventChanges {
    pub fn apply_to(self, event: &mut Event) {
        event.title = self.title;
        event.description = self.description;
        event.price = self.price;
        event.location = self.location;
        event.map_data = self.map_data;
        event.photos = self.photos;
        event.updated_at = self.updated_at;
    }
}

/// An event loaded together with the relations requested through
/// [`crate::store::Include`].
#[derive(Debug, Clone)]
pub struct EventRecord {
    pub event: Event,
    pub owner: Option<User>,
    pub bookings: Option<Vec<Booking>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum BookingStatus {
    Booked,
    Available,
}

impl BookingStatus {
    pub fn from_count(bookings: usize) -> Self {
        if bookings > 0 {
            BookingStatus::Booked
        } else {
            BookingStatus::Available
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerInfo {
    pub email: String,
    pub first_name: String,
    pub last_name: String,
}

impl From<User> for OwnerInfo {
    fn from(user: User) -> Self {
        Self {
            email: user.email,
            first_name: user.first_name,
            last_name: user.last_name,
        }
    }
}

/// Public event fields; owner id and booking rows are left out.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventInfo {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(with = "price")]
    pub price: Decimal,
    pub location: Coordinates,
    pub map_data: Coordinates,
    pub photos: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<Event> for EventInfo {
    fn from(event: Event) -> Self {
        Self {
            id: event.id,
            title: event.title,
            description: event.description,
            price: event.price,
            location: event.location,
            map_data: event.map_data,
            photos: event.photos,
            created_at: event.created_at,
            updated_at: event.updated_at,
        }
    }
}

/// Detail view returned by the fetch-by-id operation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    pub owner_info: OwnerInfo,
    pub booking_status: BookingStatus,
    pub event_info: EventInfo,
}

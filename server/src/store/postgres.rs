use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use super::{AccountStore, BookingFilter, EventFilter, EventStore, Include, StoreError};
use crate::models::{Booking, Coordinates, Credentials, Event, EventChanges, EventRecord, User};

const USER_COLUMNS: &str = "id, email, first_name, last_name, created_at, updated_at";

const EVENT_COLUMNS: &str = "id, title, description, price, location, map_data, photos, \
     event_created_by_id, created_at, updated_at";

#[derive(Debug, FromRow)]
struct EventRow {
    id: Uuid,
    title: String,
    description: String,
    price: Decimal,
    location: Json<Coordinates>,
    map_data: Json<Coordinates>,
    photos: Vec<String>,
    event_created_by_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<EventRow> for Event {
    fn from(row: EventRow) -> Self {
        Self {
            id: row.id,
            title: row.title,
            description: row.description,
            price: row.price,
            location: row.location.0,
            map_data: row.map_data.0,
            photos: row.photos,
            event_created_by_id: row.event_created_by_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// PostgreSQL binding of the persistence gateway.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_owner(&self, owner_id: Uuid) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let user = sqlx::query_as::<_, User>(&sql)
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(user)
    }

    async fn find_bookings(&self, event_id: Uuid) -> Result<Vec<Booking>, StoreError> {
        let bookings = sqlx::query_as::<_, Booking>(
            "SELECT id, event_id, user_id, created_at \
             FROM bookings WHERE event_id = $1 ORDER BY created_at",
        )
        .bind(event_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(bookings)
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn create_event(&self, event: Event) -> Result<Event, StoreError> {
        let sql = format!(
            "INSERT INTO events ({EVENT_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10) \
             RETURNING {EVENT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(event.id)
            .bind(event.title)
            .bind(event.description)
            .bind(event.price)
            .bind(Json(event.location))
            .bind(Json(event.map_data))
            .bind(event.photos)
            .bind(event.event_created_by_id)
            .bind(event.created_at)
            .bind(event.updated_at)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.into())
    }

    async fn find_event(
        &self,
        id: Uuid,
        include: Include,
    ) -> Result<Option<EventRecord>, StoreError> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM events WHERE id = $1");
        let Some(row) = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
        else {
            return Ok(None);
        };
        let event = Event::from(row);

        let owner = if include.owner {
            let owner = self
                .find_owner(event.event_created_by_id)
                .await?
                .ok_or(StoreError::MissingOwner(event.id))?;
            Some(owner)
        } else {
            None
        };

        let bookings = if include.bookings {
            Some(self.find_bookings(event.id).await?)
        } else {
            None
        };

        Ok(Some(EventRecord {
            event,
            owner,
            bookings,
        }))
    }

    async fn find_events(&self, filter: EventFilter) -> Result<Vec<Event>, StoreError> {
        let sql = format!(
            "SELECT {EVENT_COLUMNS} FROM events \
             WHERE ($1::uuid IS NULL OR event_created_by_id = $1) \
             ORDER BY created_at, id"
        );

        let rows = sqlx::query_as::<_, EventRow>(&sql)
            .bind(filter.owner_id)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(Event::from).collect())
    }

    async fn update_event(
        &self,
        id: Uuid,
        changes: EventChanges,
    ) -> Result<Option<Event>, StoreError> {
        let sql = format!(
            "UPDATE events SET title = $2, description = $3, price = $4, location = $5, \
             map_data = $6, photos = $7, updated_at = $8 \
             WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        );

        let row = sqlx::query_as::<_, EventRow>(&sql)
            .bind(id)
            .bind(changes.title)
            .bind(changes.description)
            .bind(changes.price)
            .bind(Json(changes.location))
            .bind(Json(changes.map_data))
            .bind(changes.photos)
            .bind(changes.updated_at)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Event::from))
    }

    async fn delete_event(&self, id: Uuid) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count_bookings(&self, filter: BookingFilter) -> Result<i64, StoreError> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM bookings WHERE ($1::uuid IS NULL OR event_id = $1)",
        )
        .bind(filter.event_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}

#[derive(Debug, FromRow)]
struct CredentialsRow {
    #[sqlx(flatten)]
    user: User,
    password_hash: String,
}

#[async_trait]
impl AccountStore for PgStore {
    async fn create_user(&self, user: User, password_hash: String) -> Result<User, StoreError> {
        let sql = format!(
            "INSERT INTO users ({USER_COLUMNS}, password_hash) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING {USER_COLUMNS}"
        );

        let email = user.email.clone();
        sqlx::query_as::<_, User>(&sql)
            .bind(user.id)
            .bind(user.email)
            .bind(user.first_name)
            .bind(user.last_name)
            .bind(user.created_at)
            .bind(user.updated_at)
            .bind(password_hash)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    StoreError::DuplicateEmail(email)
                }
                other => StoreError::Database(other),
            })
    }

    async fn find_credentials(&self, email: &str) -> Result<Option<Credentials>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS}, password_hash FROM users WHERE email = $1");
        let row = sqlx::query_as::<_, CredentialsRow>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(|row| Credentials {
            user: row.user,
            password_hash: row.password_hash,
        }))
    }

    async fn create_session(
        &self,
        token: Uuid,
        user_id: Uuid,
        expires_at: DateTime<Utc>,
    ) -> Result<(), StoreError> {
        sqlx::query("INSERT INTO sessions (token, user_id, expires_at) VALUES ($1, $2, $3)")
            .bind(token)
            .bind(user_id)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    async fn resolve_session(
        &self,
        token: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Option<Uuid>, StoreError> {
        let user_id = sqlx::query_scalar::<_, Uuid>(
            "SELECT user_id FROM sessions WHERE token = $1 AND expires_at > $2",
        )
        .bind(token)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user_id)
    }
}

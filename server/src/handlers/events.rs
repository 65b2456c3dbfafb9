//! HTTP handlers for the `/api/events` routes.
//!
//! Each handler extracts the caller and request data, delegates to
//! [`EventService`](crate::services::EventService) and wraps the result in the
//! standard response envelope.

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;

use crate::auth::AuthUser;
use crate::models::EventPayload;
use crate::state::AppState;
use crate::utils::error::{parse_event_id, AppError};
use crate::utils::response::{created, empty_success, success};

type EventBody = Result<Json<EventPayload>, JsonRejection>;

/// `POST /api/events/create-event`
pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    body: EventBody,
) -> Result<Response, AppError> {
    let Json(payload) = body?;
    let event = state.events.create(payload, user.user_id).await?;
    Ok(created(event, "Event created successfully"))
}

/// `GET /api/events/fetch-events`
pub async fn fetch_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list_all().await?;
    Ok(success(events, "Events fetched successfully"))
}

/// `GET /api/events/fetch-events/user`
///
/// An empty list is still a success; the message tells the client nothing
/// was found.
pub async fn fetch_user_events(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<Response, AppError> {
    let owned = state.events.list_by_owner(user.user_id).await?;
    let message = if owned.is_empty() {
        "No events found for this user"
    } else {
        "Events fetched successfully"
    };
    Ok(success(owned.events, message))
}

/// `GET /api/events/fetch-event/:id`
pub async fn fetch_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_event_id(&id)?;
    let detail = state.events.get_by_id(id).await?;
    Ok(success(detail, "Event fetched successfully"))
}

/// `PUT /api/events/update-event/:id`
pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    body: EventBody,
) -> Result<Response, AppError> {
    let id = parse_event_id(&id)?;
    let Json(payload) = body?;
    let event = state.events.update(id, payload, user.user_id).await?;
    Ok(success(event, "Event updated successfully"))
}

/// `DELETE /api/events/delete-event/:id`
pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> Result<Response, AppError> {
    let id = parse_event_id(&id)?;
    state.events.delete(id, user.user_id).await?;
    Ok(empty_success("Event deleted successfully"))
}

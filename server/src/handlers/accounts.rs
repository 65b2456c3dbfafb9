//! HTTP handlers for the `/api/auth` routes.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::response::Response;
use axum::Json;

use crate::models::{LoginPayload, SignupPayload};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

/// `POST /api/auth/signup`
pub async fn signup(
    State(state): State<AppState>,
    body: Result<Json<SignupPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = body?;
    let user = state.accounts.signup(payload).await?;
    Ok(created(user, "User registered successfully"))
}

/// `POST /api/auth/login`
pub async fn login(
    State(state): State<AppState>,
    body: Result<Json<LoginPayload>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(payload) = body?;
    let session = state.accounts.login(payload).await?;
    Ok(success(session, "Logged in successfully"))
}

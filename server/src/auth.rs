//! Caller identity for authenticated routes.
//!
//! Handlers that take an [`AuthUser`] only run once the
//! `Authorization: Bearer <token>` header has been resolved to a user id
//! through the session store.

use axum::extract::FromRequestParts;
use axum::http::header::AUTHORIZATION;
use axum::http::request::Parts;
use chrono::Utc;
use uuid::Uuid;

use crate::state::AppState;
use crate::utils::error::AppError;

/// The authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: Uuid,
}

/// Pulls the token out of an `Authorization` header value.
pub fn bearer_token(header: &str) -> Result<Uuid, AppError> {
    let token = header
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
        .ok_or_else(|| {
            AppError::AuthError("Invalid authorization format. Expected 'Bearer <token>'".into())
        })?;

    Uuid::parse_str(token).map_err(|_| AppError::AuthError("Invalid session token".into()))
}

#[axum::async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::AuthError("Missing authorization header".into()))?;

        let token = bearer_token(header)?;

        let user_id = state
            .sessions
            .resolve_session(token, Utc::now())
            .await?
            .ok_or_else(|| AppError::AuthError("Session is invalid or has expired".into()))?;

        Ok(AuthUser { user_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bearer_token_parses_uuid() {
        let token = Uuid::new_v4();
        let header = format!("Bearer {}", token);
        assert_eq!(bearer_token(&header).unwrap(), token);
    }

    #[test]
    fn test_bearer_token_rejects_other_schemes() {
        let err = bearer_token("Basic dXNlcjpwYXNz").unwrap_err();
        assert_eq!(err.code(), "AUTH_ERROR");

        assert!(bearer_token("Bearer ").is_err());
        assert!(bearer_token("Bearer not-a-uuid").is_err());
    }
}

//! Signup and login: argon2 password hashes and bearer sessions.

use std::sync::Arc;

use argon2::password_hash::{rand_core::OsRng, SaltString};
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{Duration, Utc};
use thiserror::Error;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::models::{AuthSession, LoginPayload, SignupPayload, User};
use crate::store::{AccountStore, StoreError};
use crate::validation::{validate_login, validate_signup, ValidationErrors};

pub const DEFAULT_SESSION_TTL_HOURS: i64 = 24;

#[derive(Debug, Error)]
pub enum AccountError {
    #[error("invalid account payload: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("email '{0}' is already registered")]
    EmailTaken(String),

    #[error("invalid email or password")]
    InvalidCredentials,

    #[error("password hashing failed: {0}")]
    Hashing(String),

    #[error(transparent)]
    Persistence(StoreError),
}

impl From<StoreError> for AccountError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::DuplicateEmail(email) => AccountError::EmailTaken(email),
            other => AccountError::Persistence(other),
        }
    }
}

#[derive(Clone)]
pub struct AccountService {
    store: Arc<dyn AccountStore>,
    session_ttl: Duration,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self {
            store,
            session_ttl: Duration::hours(DEFAULT_SESSION_TTL_HOURS),
        }
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.session_ttl = session_ttl;
        self
    }

    #[instrument(skip_all)]
    pub async fn signup(&self, payload: SignupPayload) -> Result<User, AccountError> {
        let signup = validate_signup(payload)?;
        let password_hash = hash_password(&signup.password)?;

        let now = Utc::now();
        let user = User {
            id: Uuid::new_v4(),
            email: signup.email,
            first_name: signup.first_name,
            last_name: signup.last_name,
            created_at: now,
            updated_at: now,
        };

        let user = self.store.create_user(user, password_hash).await?;
        info!(user_id = %user.id, "User registered");
        Ok(user)
    }

    #[instrument(skip_all)]
    pub async fn login(&self, payload: LoginPayload) -> Result<AuthSession, AccountError> {
        let (email, password) = validate_login(payload)?;

        let Some(credentials) = self.store.find_credentials(&email).await? else {
            warn!("Login attempt for unknown email");
            return Err(AccountError::InvalidCredentials);
        };

        if !verify_password(&password, &credentials.password_hash) {
            warn!(user_id = %credentials.user.id, "Login attempt with wrong password");
            return Err(AccountError::InvalidCredentials);
        }

        let token = Uuid::new_v4();
        let expires_at = Utc::now() + self.session_ttl;
        self.store
            .create_session(token, credentials.user.id, expires_at)
            .await?;

        info!(user_id = %credentials.user.id, "Session created");
        Ok(AuthSession {
            token,
            expires_at,
            user: credentials.user,
        })
    }
}

fn hash_password(plaintext: &str) -> Result<String, AccountError> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(plaintext.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AccountError::Hashing(e.to_string()))
}

fn verify_password(plaintext: &str, hash: &str) -> bool {
    let Ok(parsed) = PasswordHash::new(hash) else {
        return false;
    };

    Argon2::default()
        .verify_password(plaintext.as_bytes(), &parsed)
        .is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn signup_payload(email: &str) -> SignupPayload {
        SignupPayload {
            email: Some(email.to_string()),
            password: Some("correct horse".to_string()),
            first_name: Some("Ada".to_string()),
            last_name: Some("Lovelace".to_string()),
        }
    }

    fn login_payload(email: &str, password: &str) -> LoginPayload {
        LoginPayload {
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn setup() -> (Arc<MemoryStore>, AccountService) {
        let store = Arc::new(MemoryStore::new());
        let service = AccountService::new(store.clone());
        (store, service)
    }

    #[test]
    fn test_password_hash_round_trip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong horse", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }

    #[tokio::test]
    async fn test_signup_then_login_issues_resolvable_session() {
        let (store, service) = setup();
        let user = service.signup(signup_payload("ada@example.com")).await.unwrap();

        let session = service
            .login(login_payload("ADA@example.com", "correct horse"))
            .await
            .unwrap();

        assert_eq!(session.user, user);
        let resolved = store.resolve_session(session.token, Utc::now()).await.unwrap();
        assert_eq!(resolved, Some(user.id));
    }

    #[tokio::test]
    async fn test_signup_rejects_taken_email() {
        let (_, service) = setup();
        service.signup(signup_payload("ada@example.com")).await.unwrap();

        let err = service
            .signup(signup_payload("ada@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::EmailTaken(_)));
    }

    #[tokio::test]
    async fn test_login_with_wrong_password_or_unknown_email() {
        let (_, service) = setup();
        service.signup(signup_payload("ada@example.com")).await.unwrap();

        let err = service
            .login(login_payload("ada@example.com", "wrong horse"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));

        let err = service
            .login(login_payload("bob@example.com", "correct horse"))
            .await
            .unwrap_err();
        assert!(matches!(err, AccountError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_session_ttl_is_applied() {
        let (store, service) = setup();
        let service = service.with_session_ttl(Duration::seconds(-1));
        service.signup(signup_payload("ada@example.com")).await.unwrap();

        let session = service
            .login(login_payload("ada@example.com", "correct horse"))
            .await
            .unwrap();
        assert!(store
            .resolve_session(session.token, Utc::now())
            .await
            .unwrap()
            .is_none());
    }
}

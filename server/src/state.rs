//! Application state shared across all request handlers.

use std::sync::Arc;

use chrono::Duration;
use sqlx::PgPool;

use crate::services::{AccountService, EventService};
use crate::store::{AccountStore, EventStore, PgStore};

/// Cheap to clone; everything is behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    pub events: EventService,
    pub accounts: AccountService,
    /// Session lookups for the [`AuthUser`](crate::auth::AuthUser) extractor.
    pub sessions: Arc<dyn AccountStore>,
}

impl AppState {
    pub fn new(events: Arc<dyn EventStore>, accounts: Arc<dyn AccountStore>) -> Self {
        Self {
            events: EventService::new(events),
            accounts: AccountService::new(accounts.clone()),
            sessions: accounts,
        }
    }

    /// State backed by a single store that serves both events and accounts.
    pub fn with_store<S>(store: Arc<S>) -> Self
    where
        S: EventStore + AccountStore + 'static,
    {
        Self::new(store.clone(), store)
    }

    pub fn postgres(pool: PgPool) -> Self {
        Self::with_store(Arc::new(PgStore::new(pool)))
    }

    pub fn with_session_ttl(mut self, session_ttl: Duration) -> Self {
        self.accounts = self.accounts.with_session_ttl(session_ttl);
        self
    }
}

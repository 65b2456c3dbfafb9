use axum::routing::{delete, get, post, put};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::config::{apply_security_headers, create_cors_layer, Config};
use crate::handlers::{accounts, events, health_check, not_found};
use crate::state::AppState;

pub fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/create-event", post(events::create_event))
        .route("/fetch-events", get(events::fetch_events))
        .route("/fetch-events/user", get(events::fetch_user_events))
        .route("/fetch-event/:id", get(events::fetch_event))
        .route("/update-event/:id", put(events::update_event))
        .route("/delete-event/:id", delete(events::delete_event))
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(accounts::signup))
        .route("/login", post(accounts::login))
}

pub fn create_routes(state: AppState, config: &Config) -> Router {
    let router = Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes())
        .nest("/api/events", event_routes())
        .fallback(not_found);

    apply_security_headers(router, config.production)
        .layer(create_cors_layer(&config.cors_allowed_origins))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

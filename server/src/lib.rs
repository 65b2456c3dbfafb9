//! Event listing API: create, browse, update and delete events, with
//! ownership checks and a booking lock on mutation.

pub mod auth;
pub mod config;
pub mod handlers;
pub mod models;
pub mod routes;
pub mod services;
pub mod shutdown;
pub mod state;
pub mod store;
pub mod utils;
pub mod validation;

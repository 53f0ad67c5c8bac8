pub mod config;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod services;
pub mod state;
pub mod store;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route(
            "/api/bookings",
            post(handlers::bookings::create).get(handlers::bookings::list_bookings),
        )
        .route("/api/bookings/:id", get(handlers::bookings::get_booking))
        .route("/api/bookings/:id/cancel", post(handlers::bookings::cancel))
        .route(
            "/api/bookings/:id/confirm",
            post(handlers::bookings::confirm),
        )
        .route(
            "/api/bookings/:id/check-in",
            post(handlers::bookings::check_in),
        )
        .route(
            "/api/bookings/:id/check-out",
            post(handlers::bookings::check_out),
        )
        .route(
            "/api/bookings/:id/no-show",
            post(handlers::bookings::mark_no_show),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::Json;
use serde::Deserialize;

use crate::errors::{DomainError, DomainResult};
use crate::models::Booking;
use crate::services::booking::CreateBookingInput;
use crate::services::{booking, lifecycle};
use crate::state::AppState;

/// The HTTP layer upstream has already authenticated the caller; the user
/// id arrives in this header.
fn user_id(headers: &HeaderMap) -> DomainResult<String> {
    headers
        .get("x-user-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
        .ok_or(DomainError::Unauthorized)
}

// POST /api/bookings
pub async fn create(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(input): Json<CreateBookingInput>,
) -> DomainResult<(StatusCode, Json<Booking>)> {
    let user = user_id(&headers)?;
    let created = booking::create_booking(&state.store, &input, &user)?;
    Ok((StatusCode::CREATED, Json(created)))
}

// GET /api/bookings/:id
pub async fn get_booking(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> DomainResult<Json<Booking>> {
    let user = user_id(&headers)?;
    let found = state
        .store
        .booking(&id)?
        .ok_or_else(|| DomainError::not_found("booking"))?;

    if found.user_id != user {
        let role = state.store.user_role(&user, &found.establishment_id)?;
        if !matches!(role.as_deref(), Some("OWNER") | Some("STAFF")) {
            return Err(DomainError::Forbidden(
                "not your booking".to_string(),
            ));
        }
    }

    Ok(Json(found))
}

// GET /api/bookings
#[derive(Deserialize)]
pub struct BookingsQuery {
    pub status: Option<String>,
    pub limit: Option<i64>,
}

pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Query(query): Query<BookingsQuery>,
) -> DomainResult<Json<Vec<Booking>>> {
    let user = user_id(&headers)?;
    let limit = query.limit.unwrap_or(50);
    let bookings = state
        .store
        .bookings_for_user(&user, query.status.as_deref(), limit)?;
    Ok(Json(bookings))
}

// POST /api/bookings/:id/cancel
#[derive(Deserialize)]
pub struct CancelRequest {
    pub reason: Option<String>,
}

pub async fn cancel(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
    body: Option<Json<CancelRequest>>,
) -> DomainResult<Json<Booking>> {
    let user = user_id(&headers)?;
    let reason = body.as_ref().and_then(|b| b.reason.as_deref());
    let updated = lifecycle::cancel(&state.store, &id, &user, reason)?;
    Ok(Json(updated))
}

// POST /api/bookings/:id/confirm
pub async fn confirm(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> DomainResult<Json<Booking>> {
    let user = user_id(&headers)?;
    let updated = lifecycle::confirm(&state.store, &id, &user)?;
    Ok(Json(updated))
}

// POST /api/bookings/:id/check-in
pub async fn check_in(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> DomainResult<Json<Booking>> {
    let user = user_id(&headers)?;
    let updated = lifecycle::check_in(&state.store, &id, &user)?;
    Ok(Json(updated))
}

// POST /api/bookings/:id/check-out
pub async fn check_out(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> DomainResult<Json<Booking>> {
    let user = user_id(&headers)?;
    let updated = lifecycle::check_out(&state.store, &id, &user)?;
    Ok(Json(updated))
}

// POST /api/bookings/:id/no-show
pub async fn mark_no_show(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> DomainResult<Json<Booking>> {
    let user = user_id(&headers)?;
    let updated = lifecycle::mark_no_show(&state.store, &id, &user)?;
    Ok(Json(updated))
}

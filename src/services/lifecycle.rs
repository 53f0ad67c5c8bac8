//! Lifecycle transitions: authorize, check the state machine, then apply
//! the status change and its compensations in one transaction. The status
//! write is a compare-and-set against the status observed at load time, so
//! a concurrent transition makes the whole transaction fail instead of
//! double-applying compensations.

use chrono::{NaiveDate, Utc};

use crate::errors::{DomainError, DomainResult};
use crate::models::booking::next_status;
use crate::models::{Booking, LifecycleAction, RoomStatus};
use crate::store::Store;

pub fn cancel(
    store: &Store,
    booking_id: &str,
    user_id: &str,
    reason: Option<&str>,
) -> DomainResult<Booking> {
    let booking = load(store, booking_id)?;

    // Cancellation is the one transition the booking owner may perform.
    if booking.user_id != user_id {
        require_staff(store, user_id, &booking.establishment_id).map_err(|_| {
            DomainError::Forbidden(
                "only the booking owner or establishment staff may cancel".to_string(),
            )
        })?;
    }

    let next = next_status(booking.status, LifecycleAction::Cancel)?;
    let now = Utc::now().naive_utc();

    store.in_transaction(|tx| {
        if !tx.transition_booking(&booking.id, booking.status, next, &now, reason)? {
            return Err(concurrent_change());
        }
        tx.increment_capacity(&booking.availability_id, booking.quantity)?;
        if let Some(room_id) = &booking.room_id {
            tx.update_room_status(room_id, RoomStatus::Available)?;
        }
        Ok(())
    })?;

    tracing::info!(booking_id = %booking.id, "booking cancelled");
    load(store, booking_id)
}

pub fn confirm(store: &Store, booking_id: &str, user_id: &str) -> DomainResult<Booking> {
    let booking = load(store, booking_id)?;
    require_staff(store, user_id, &booking.establishment_id)?;

    let next = next_status(booking.status, LifecycleAction::Confirm)?;
    let now = Utc::now().naive_utc();

    store.in_transaction(|tx| {
        if !tx.transition_booking(&booking.id, booking.status, next, &now, None)? {
            return Err(concurrent_change());
        }
        Ok(())
    })?;

    tracing::info!(booking_id = %booking.id, "booking confirmed");
    load(store, booking_id)
}

pub fn check_in(store: &Store, booking_id: &str, user_id: &str) -> DomainResult<Booking> {
    check_in_on(store, booking_id, user_id, Utc::now().date_naive())
}

/// Clock-injected variant so the check-in date gate is testable.
pub fn check_in_on(
    store: &Store,
    booking_id: &str,
    user_id: &str,
    today: NaiveDate,
) -> DomainResult<Booking> {
    let booking = load(store, booking_id)?;
    require_staff(store, user_id, &booking.establishment_id)?;

    let check_in_date = booking
        .check_in_date
        .ok_or_else(|| DomainError::conflict("only hotel bookings can be checked in"))?;
    if today < check_in_date {
        return Err(DomainError::conflict(format!(
            "check-in opens on {check_in_date}"
        )));
    }

    let next = next_status(booking.status, LifecycleAction::CheckIn)?;
    let now = Utc::now().naive_utc();

    store.in_transaction(|tx| {
        if !tx.transition_booking(&booking.id, booking.status, next, &now, None)? {
            return Err(concurrent_change());
        }
        Ok(())
    })?;

    tracing::info!(booking_id = %booking.id, "guest checked in");
    load(store, booking_id)
}

pub fn check_out(store: &Store, booking_id: &str, user_id: &str) -> DomainResult<Booking> {
    let booking = load(store, booking_id)?;
    require_staff(store, user_id, &booking.establishment_id)?;

    let next = next_status(booking.status, LifecycleAction::CheckOut)?;
    let now = Utc::now().naive_utc();

    store.in_transaction(|tx| {
        if !tx.transition_booking(&booking.id, booking.status, next, &now, None)? {
            return Err(concurrent_change());
        }
        if let Some(room_id) = &booking.room_id {
            tx.update_room_status(room_id, RoomStatus::Available)?;
        }
        Ok(())
    })?;

    tracing::info!(booking_id = %booking.id, "guest checked out");
    load(store, booking_id)
}

pub fn mark_no_show(store: &Store, booking_id: &str, user_id: &str) -> DomainResult<Booking> {
    let booking = load(store, booking_id)?;
    require_staff(store, user_id, &booking.establishment_id)?;

    let next = next_status(booking.status, LifecycleAction::NoShow)?;
    let now = Utc::now().naive_utc();

    store.in_transaction(|tx| {
        if !tx.transition_booking(&booking.id, booking.status, next, &now, None)? {
            return Err(concurrent_change());
        }
        if let Some(room_id) = &booking.room_id {
            tx.update_room_status(room_id, RoomStatus::Available)?;
        }
        Ok(())
    })?;

    tracing::info!(booking_id = %booking.id, "booking marked as no-show");
    load(store, booking_id)
}

fn load(store: &Store, booking_id: &str) -> DomainResult<Booking> {
    store
        .booking(booking_id)?
        .ok_or_else(|| DomainError::not_found("booking"))
}

fn require_staff(store: &Store, user_id: &str, establishment_id: &str) -> DomainResult<()> {
    match store.user_role(user_id, establishment_id)?.as_deref() {
        Some("OWNER") | Some("STAFF") => Ok(()),
        _ => Err(DomainError::Forbidden(
            "requires OWNER or STAFF role on the establishment".to_string(),
        )),
    }
}

fn concurrent_change() -> DomainError {
    DomainError::conflict("booking was modified concurrently, please retry")
}

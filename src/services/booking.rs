//! Booking creation: read-only validation first, then one transaction that
//! re-verifies capacity/room under isolation, writes the booking row and its
//! extra lines, and commits all-or-nothing.

use chrono::{NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::{DomainError, DomainResult};
use crate::models::{Booking, BookingExtraLine, BookingStatus, RoomStatus, ServiceKind};
use crate::services::{capacity, pricing};
use crate::store::Store;

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingInput {
    pub service_id: String,
    pub availability_id: String,
    pub quantity: i32,
    #[serde(default)]
    pub extras: Vec<ExtraRequest>,
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub room_id: Option<String>,
    pub number_of_guests: Option<i32>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_document: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtraRequest {
    pub extra_item_id: String,
    pub quantity: i32,
}

struct HotelPlan {
    check_in: NaiveDate,
    check_out: NaiveDate,
    nights: i32,
    room_id: String,
}

pub fn create_booking(
    store: &Store,
    input: &CreateBookingInput,
    user_id: &str,
) -> DomainResult<Booking> {
    if input.quantity < 1 {
        return Err(DomainError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }

    let service = store
        .service(&input.service_id)?
        .ok_or_else(|| DomainError::not_found("service"))?;
    if !service.active {
        return Err(DomainError::conflict("service is not active"));
    }

    let availability = store
        .availability(&input.availability_id)?
        .ok_or_else(|| DomainError::not_found("availability"))?;
    if availability.service_id != service.id {
        return Err(DomainError::conflict(
            "availability does not belong to this service",
        ));
    }
    capacity::time_range_valid(&availability.start_time, &availability.end_time)?;

    let hotel = match service.kind {
        ServiceKind::Hotel => Some(plan_hotel_stay(store, input, &service.id)?),
        ServiceKind::Service => {
            capacity::has_capacity(&availability, input.quantity)?;
            None
        }
    };

    let mut extras = Vec::with_capacity(input.extras.len());
    for request in &input.extras {
        let item = store
            .extra_item(&request.extra_item_id)?
            .ok_or_else(|| DomainError::not_found("extra item"))?;
        extras.push((item, request.quantity));
    }

    let basis = match &hotel {
        Some(plan) => pricing::PriceBasis::Nights(plan.nights),
        None => pricing::PriceBasis::Quantity(input.quantity),
    };
    let quote = pricing::quote(&service, &availability, basis, &extras)?;

    let now = Utc::now().naive_utc();
    let booking_id = Uuid::new_v4().to_string();
    let lines: Vec<BookingExtraLine> = quote
        .lines
        .into_iter()
        .map(|line| BookingExtraLine {
            id: Uuid::new_v4().to_string(),
            booking_id: booking_id.clone(),
            extra_item_id: line.extra_item_id,
            quantity: line.quantity,
            price_at_booking: line.price_at_booking,
        })
        .collect();

    // Auto-confirmed on creation; no flow produces a PENDING booking.
    let booking = Booking {
        id: booking_id,
        user_id: user_id.to_string(),
        establishment_id: service.establishment_id.clone(),
        service_id: service.id.clone(),
        availability_id: availability.id.clone(),
        quantity: input.quantity,
        total_price: quote.total,
        status: BookingStatus::Confirmed,
        notes: input.notes.clone(),
        check_in_date: hotel.as_ref().map(|plan| plan.check_in),
        check_out_date: hotel.as_ref().map(|plan| plan.check_out),
        room_id: hotel.as_ref().map(|plan| plan.room_id.clone()),
        number_of_nights: hotel.as_ref().map(|plan| plan.nights),
        number_of_guests: input.number_of_guests,
        guest_name: input.guest_name.clone(),
        guest_email: input.guest_email.clone(),
        guest_phone: input.guest_phone.clone(),
        guest_document: input.guest_document.clone(),
        confirmed_at: Some(now),
        cancelled_at: None,
        cancelled_reason: None,
        checked_in_at: None,
        checked_out_at: None,
        created_at: now,
        updated_at: now,
        extras: lines,
    };

    store.in_transaction(|tx| {
        // The pre-transaction checks above are fast-fail only; this
        // conditional decrement is what actually closes the race window.
        if !tx.decrement_capacity(&availability.id, input.quantity)? {
            return Err(DomainError::conflict(
                "not enough capacity for the requested quantity",
            ));
        }

        if let Some(plan) = &hotel {
            if !tx.room_is_free_for_range(&plan.room_id, &plan.check_in, &plan.check_out)? {
                return Err(DomainError::conflict(
                    "room is no longer available for the requested dates",
                ));
            }
            tx.update_room_status(&plan.room_id, RoomStatus::Occupied)?;
        }

        tx.insert_booking(&booking)?;
        Ok(())
    })?;

    tracing::info!(
        booking_id = %booking.id,
        service_id = %booking.service_id,
        total = %booking.total_price,
        "booking created"
    );

    Ok(booking)
}

fn plan_hotel_stay(
    store: &Store,
    input: &CreateBookingInput,
    service_id: &str,
) -> DomainResult<HotelPlan> {
    let check_in = input.check_in_date.ok_or_else(|| {
        DomainError::Validation("checkInDate is required for hotel bookings".to_string())
    })?;
    let check_out = input.check_out_date.ok_or_else(|| {
        DomainError::Validation("checkOutDate is required for hotel bookings".to_string())
    })?;
    let nights = capacity::validate_hotel_dates(&check_in, &check_out)?;

    let free = store.find_available_rooms(service_id, &check_in, &check_out)?;

    let room_id = match &input.room_id {
        Some(room_id) => {
            let room = store
                .room(room_id)?
                .ok_or_else(|| DomainError::not_found("room"))?;
            capacity::room_is_bookable(&room, service_id)?;
            if !free.iter().any(|r| r.id == room.id) {
                return Err(DomainError::conflict(
                    "room is not available for the requested dates",
                ));
            }
            room.id
        }
        // First free room, ordered by floor then number.
        None => match free.first() {
            Some(room) => room.id.clone(),
            None => {
                return Err(DomainError::conflict(
                    "no rooms available for the requested dates",
                ))
            }
        },
    };

    Ok(HotelPlan {
        check_in,
        check_out,
        nights,
        room_id,
    })
}

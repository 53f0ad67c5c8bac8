//! The two mutually exclusive reservation strategies: quantity against slot
//! capacity, and room-per-date-range. Pure checks only; the authoritative
//! re-checks happen again inside the write transaction.

use chrono::NaiveDate;

use crate::errors::{DomainError, DomainResult};
use crate::models::{Availability, Room, RoomStatus};

pub fn has_capacity(availability: &Availability, quantity: i32) -> DomainResult<()> {
    if quantity < 1 {
        return Err(DomainError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    if availability.capacity < quantity {
        return Err(DomainError::conflict(format!(
            "not enough capacity: {} requested, {} remaining",
            quantity, availability.capacity
        )));
    }
    Ok(())
}

pub fn room_is_bookable(room: &Room, service_id: &str) -> DomainResult<()> {
    if room.service_id != service_id {
        return Err(DomainError::conflict(
            "room does not belong to this service",
        ));
    }
    if room.status != RoomStatus::Available {
        return Err(DomainError::conflict(format!(
            "room {} is {}",
            room.number,
            room.status.as_str()
        )));
    }
    Ok(())
}

/// Whole-day night count; check-out must fall strictly after check-in.
pub fn validate_hotel_dates(check_in: &NaiveDate, check_out: &NaiveDate) -> DomainResult<i32> {
    if check_out <= check_in {
        return Err(DomainError::conflict(
            "check-out date must be after check-in date",
        ));
    }
    Ok((*check_out - *check_in).num_days() as i32)
}

/// `HH:MM` strings compare correctly lexicographically.
pub fn time_range_valid(start: &str, end: &str) -> DomainResult<()> {
    if start >= end {
        return Err(DomainError::conflict("start time must be before end time"));
    }
    Ok(())
}

/// Authoring-time collision check over half-open `[start, end)` windows:
/// either start falls inside the other range, or one contains the other.
pub fn slots_overlap(a_start: &str, a_end: &str, b_start: &str, b_end: &str) -> bool {
    (a_start >= b_start && a_start < b_end)
        || (b_start >= a_start && b_start < a_end)
        || (a_start <= b_start && a_end >= b_end)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn slot(capacity: i32) -> Availability {
        Availability {
            id: "avail-1".to_string(),
            service_id: "svc-1".to_string(),
            date: date("2025-06-16"),
            start_time: "10:00".to_string(),
            end_time: "11:00".to_string(),
            capacity,
            price: None,
            recurring: false,
        }
    }

    #[test]
    fn test_has_capacity() {
        assert!(has_capacity(&slot(3), 3).is_ok());
        assert!(has_capacity(&slot(3), 1).is_ok());
    }

    #[test]
    fn test_has_capacity_insufficient() {
        let err = has_capacity(&slot(2), 3).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
    }

    #[test]
    fn test_has_capacity_rejects_non_positive_quantity() {
        assert!(matches!(
            has_capacity(&slot(5), 0),
            Err(DomainError::Validation(_))
        ));
        assert!(matches!(
            has_capacity(&slot(5), -1),
            Err(DomainError::Validation(_))
        ));
    }

    fn room(status: RoomStatus) -> Room {
        Room {
            id: "room-1".to_string(),
            service_id: "svc-h".to_string(),
            number: "101".to_string(),
            floor: 1,
            status,
        }
    }

    #[test]
    fn test_room_is_bookable() {
        assert!(room_is_bookable(&room(RoomStatus::Available), "svc-h").is_ok());
    }

    #[test]
    fn test_room_wrong_service() {
        assert!(room_is_bookable(&room(RoomStatus::Available), "svc-other").is_err());
    }

    #[test]
    fn test_room_not_available() {
        for status in [
            RoomStatus::Occupied,
            RoomStatus::Cleaning,
            RoomStatus::Maintenance,
            RoomStatus::Blocked,
        ] {
            let err = room_is_bookable(&room(status), "svc-h").unwrap_err();
            assert!(matches!(err, DomainError::Conflict(_)));
        }
    }

    #[test]
    fn test_validate_hotel_dates() {
        let nights = validate_hotel_dates(&date("2025-06-01"), &date("2025-06-05")).unwrap();
        assert_eq!(nights, 4);
    }

    #[test]
    fn test_validate_hotel_dates_single_night() {
        let nights = validate_hotel_dates(&date("2025-06-01"), &date("2025-06-02")).unwrap();
        assert_eq!(nights, 1);
    }

    #[test]
    fn test_validate_hotel_dates_rejects_inverted_and_equal() {
        assert!(validate_hotel_dates(&date("2025-06-05"), &date("2025-06-01")).is_err());
        assert!(validate_hotel_dates(&date("2025-06-01"), &date("2025-06-01")).is_err());
    }

    #[test]
    fn test_time_range_valid() {
        assert!(time_range_valid("09:00", "17:00").is_ok());
        assert!(time_range_valid("17:00", "09:00").is_err());
        assert!(time_range_valid("09:00", "09:00").is_err());
    }

    #[test]
    fn test_slots_overlap() {
        // Partial overlap both ways.
        assert!(slots_overlap("10:00", "11:00", "10:30", "11:30"));
        assert!(slots_overlap("10:30", "11:30", "10:00", "11:00"));
        // Containment both ways.
        assert!(slots_overlap("10:00", "12:00", "10:30", "11:00"));
        assert!(slots_overlap("10:30", "11:00", "10:00", "12:00"));
        // Identical.
        assert!(slots_overlap("10:00", "11:00", "10:00", "11:00"));
    }

    #[test]
    fn test_slots_adjacent_do_not_overlap() {
        assert!(!slots_overlap("10:00", "11:00", "11:00", "12:00"));
        assert!(!slots_overlap("11:00", "12:00", "10:00", "11:00"));
        assert!(!slots_overlap("08:00", "09:00", "13:00", "14:00"));
    }

    #[test]
    fn test_slot_price_override_field_is_orthogonal() {
        let mut s = slot(1);
        s.price = Some(Decimal::new(7500, 2));
        assert!(has_capacity(&s, 1).is_ok());
    }
}

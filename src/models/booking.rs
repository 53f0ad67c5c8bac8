use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::{DomainError, DomainResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub establishment_id: String,
    pub service_id: String,
    pub availability_id: String,
    pub quantity: i32,
    pub total_price: Decimal,
    pub status: BookingStatus,
    pub notes: Option<String>,

    // Hotel-only fields.
    pub check_in_date: Option<NaiveDate>,
    pub check_out_date: Option<NaiveDate>,
    pub room_id: Option<String>,
    pub number_of_nights: Option<i32>,
    pub number_of_guests: Option<i32>,
    pub guest_name: Option<String>,
    pub guest_email: Option<String>,
    pub guest_phone: Option<String>,
    pub guest_document: Option<String>,

    // Lifecycle timestamps, set by the transition that reaches each state.
    pub confirmed_at: Option<NaiveDateTime>,
    pub cancelled_at: Option<NaiveDateTime>,
    pub cancelled_reason: Option<String>,
    pub checked_in_at: Option<NaiveDateTime>,
    pub checked_out_at: Option<NaiveDateTime>,

    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,

    pub extras: Vec<BookingExtraLine>,
}

/// One extra-item line on a booking. `price_at_booking` snapshots the item
/// price at creation; later edits to the `ExtraItem` never change it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookingExtraLine {
    pub id: String,
    pub booking_id: String,
    pub extra_item_id: String,
    pub quantity: i32,
    pub price_at_booking: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    CheckedIn,
    CheckedOut,
    NoShow,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "PENDING",
            BookingStatus::Confirmed => "CONFIRMED",
            BookingStatus::Cancelled => "CANCELLED",
            BookingStatus::CheckedIn => "CHECKED_IN",
            BookingStatus::CheckedOut => "CHECKED_OUT",
            BookingStatus::NoShow => "NO_SHOW",
        }
    }

    /// Strict: a status string outside the known set means a corrupted row
    /// and must not be mistaken for a live booking.
    pub fn parse(s: &str) -> anyhow::Result<Self> {
        match s {
            "PENDING" => Ok(BookingStatus::Pending),
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            "CANCELLED" => Ok(BookingStatus::Cancelled),
            "CHECKED_IN" => Ok(BookingStatus::CheckedIn),
            "CHECKED_OUT" => Ok(BookingStatus::CheckedOut),
            "NO_SHOW" => Ok(BookingStatus::NoShow),
            other => Err(anyhow::anyhow!("unknown booking status: {other}")),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            BookingStatus::Cancelled | BookingStatus::CheckedOut | BookingStatus::NoShow
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleAction {
    Confirm,
    Cancel,
    CheckIn,
    CheckOut,
    NoShow,
}

impl LifecycleAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LifecycleAction::Confirm => "confirm",
            LifecycleAction::Cancel => "cancel",
            LifecycleAction::CheckIn => "check in",
            LifecycleAction::CheckOut => "check out",
            LifecycleAction::NoShow => "mark as no-show",
        }
    }
}

/// The transition table. Anything not listed here, including every move out
/// of a terminal state, is a `Conflict` naming the current state.
pub fn next_status(current: BookingStatus, action: LifecycleAction) -> DomainResult<BookingStatus> {
    use BookingStatus::*;

    let next = match (current, action) {
        (Pending, LifecycleAction::Confirm) => Confirmed,
        (Confirmed, LifecycleAction::Cancel) => Cancelled,
        (Confirmed | Pending, LifecycleAction::CheckIn) => CheckedIn,
        (CheckedIn, LifecycleAction::CheckOut) => CheckedOut,
        (Confirmed | Pending, LifecycleAction::NoShow) => NoShow,
        (from, action) => {
            return Err(DomainError::conflict(format!(
                "booking is {}, cannot {}",
                from.as_str(),
                action.as_str()
            )))
        }
    };
    Ok(next)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_creation_state_transitions() {
        assert_eq!(
            next_status(BookingStatus::Pending, LifecycleAction::Confirm).unwrap(),
            BookingStatus::Confirmed
        );
        assert_eq!(
            next_status(BookingStatus::Confirmed, LifecycleAction::Cancel).unwrap(),
            BookingStatus::Cancelled
        );
        assert_eq!(
            next_status(BookingStatus::Confirmed, LifecycleAction::CheckIn).unwrap(),
            BookingStatus::CheckedIn
        );
        assert_eq!(
            next_status(BookingStatus::Pending, LifecycleAction::CheckIn).unwrap(),
            BookingStatus::CheckedIn
        );
        assert_eq!(
            next_status(BookingStatus::CheckedIn, LifecycleAction::CheckOut).unwrap(),
            BookingStatus::CheckedOut
        );
        assert_eq!(
            next_status(BookingStatus::Pending, LifecycleAction::NoShow).unwrap(),
            BookingStatus::NoShow
        );
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let terminals = [
            BookingStatus::Cancelled,
            BookingStatus::CheckedOut,
            BookingStatus::NoShow,
        ];
        let actions = [
            LifecycleAction::Confirm,
            LifecycleAction::Cancel,
            LifecycleAction::CheckIn,
            LifecycleAction::CheckOut,
            LifecycleAction::NoShow,
        ];
        for status in terminals {
            assert!(status.is_terminal());
            for action in actions {
                assert!(next_status(status, action).is_err());
            }
        }
    }

    #[test]
    fn test_double_cancel_is_conflict() {
        let after = next_status(BookingStatus::Confirmed, LifecycleAction::Cancel).unwrap();
        let err = next_status(after, LifecycleAction::Cancel).unwrap_err();
        assert!(matches!(err, DomainError::Conflict(_)));
        assert!(err.to_string().contains("CANCELLED"));
    }

    #[test]
    fn test_confirm_requires_pending() {
        assert!(next_status(BookingStatus::Confirmed, LifecycleAction::Confirm).is_err());
    }

    #[test]
    fn test_check_out_requires_checked_in() {
        assert!(next_status(BookingStatus::Confirmed, LifecycleAction::CheckOut).is_err());
        assert!(next_status(BookingStatus::Pending, LifecycleAction::CheckOut).is_err());
    }

    #[test]
    fn test_cancel_not_allowed_from_pending() {
        assert!(next_status(BookingStatus::Pending, LifecycleAction::Cancel).is_err());
    }

    #[test]
    fn test_status_round_trip() {
        for s in [
            BookingStatus::Pending,
            BookingStatus::Confirmed,
            BookingStatus::Cancelled,
            BookingStatus::CheckedIn,
            BookingStatus::CheckedOut,
            BookingStatus::NoShow,
        ] {
            assert_eq!(BookingStatus::parse(s.as_str()).unwrap(), s);
        }
    }

    #[test]
    fn test_parse_rejects_unknown_status() {
        let err = BookingStatus::parse("ARCHIVED").unwrap_err();
        assert!(err.to_string().contains("ARCHIVED"));
        assert!(BookingStatus::parse("confirmed").is_err());
        assert!(BookingStatus::parse("").is_err());
    }
}

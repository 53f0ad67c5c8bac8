use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A bookable time slot. `capacity` is the remaining bookable units and is
/// the concurrency-contended counter for non-hotel bookings: decremented at
/// creation, restored on cancellation, never negative.
///
/// `start_time`/`end_time` are `HH:MM` strings; they compare correctly as
/// plain strings, which is how all range checks here are written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Availability {
    pub id: String,
    pub service_id: String,
    pub date: NaiveDate,
    pub start_time: String,
    pub end_time: String,
    pub capacity: i32,
    pub price: Option<Decimal>,
    pub recurring: bool,
}

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::{DomainError, DomainResult};
use crate::models::{Availability, Booking, BookingStatus, ExtraItem, Room, RoomStatus, Service};

/// Storage seam for the booking engine. Reads run outside any transaction;
/// all mutations go through [`Store::in_transaction`], which is the
/// unit-of-work boundary: the closure gets a [`TxRepos`] handle, `Ok`
/// commits, `Err` (or an early drop) rolls everything back.
#[derive(Clone)]
pub struct Store {
    conn: Arc<Mutex<Connection>>,
}

impl Store {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn service(&self, id: &str) -> DomainResult<Option<Service>> {
        Ok(queries::get_service(&self.lock(), id)?)
    }

    pub fn availability(&self, id: &str) -> DomainResult<Option<Availability>> {
        Ok(queries::get_availability(&self.lock(), id)?)
    }

    pub fn room(&self, id: &str) -> DomainResult<Option<Room>> {
        Ok(queries::get_room(&self.lock(), id)?)
    }

    pub fn extra_item(&self, id: &str) -> DomainResult<Option<ExtraItem>> {
        Ok(queries::get_extra_item(&self.lock(), id)?)
    }

    pub fn find_available_rooms(
        &self,
        service_id: &str,
        check_in: &NaiveDate,
        check_out: &NaiveDate,
    ) -> DomainResult<Vec<Room>> {
        Ok(queries::find_available_rooms(&self.lock(), service_id, check_in, check_out)?)
    }

    pub fn user_role(&self, user_id: &str, establishment_id: &str) -> DomainResult<Option<String>> {
        Ok(queries::get_user_role(&self.lock(), user_id, establishment_id)?)
    }

    pub fn booking(&self, id: &str) -> DomainResult<Option<Booking>> {
        Ok(queries::get_booking(&self.lock(), id)?)
    }

    pub fn bookings_for_user(
        &self,
        user_id: &str,
        status_filter: Option<&str>,
        limit: i64,
    ) -> DomainResult<Vec<Booking>> {
        Ok(queries::get_bookings_for_user(&self.lock(), user_id, status_filter, limit)?)
    }

    /// Escape hatch for seeding and maintenance paths that sit outside the
    /// engine's contract.
    pub fn with_conn<T>(&self, f: impl FnOnce(&Connection) -> anyhow::Result<T>) -> anyhow::Result<T> {
        f(&self.lock())
    }

    pub fn in_transaction<T>(
        &self,
        f: impl FnOnce(&TxRepos<'_>) -> DomainResult<T>,
    ) -> DomainResult<T> {
        let mut conn = self.lock();
        let tx = conn
            .transaction()
            .map_err(|e| DomainError::Database(e.into()))?;

        let repos = TxRepos { tx: &tx };
        match f(&repos) {
            Ok(value) => {
                tx.commit().map_err(|e| DomainError::Database(e.into()))?;
                Ok(value)
            }
            // Dropping the transaction rolls it back.
            Err(e) => Err(e),
        }
    }
}

/// Transactionally scoped repository handles. Exposes exactly the mutations
/// a booking-affecting operation may perform.
pub struct TxRepos<'a> {
    tx: &'a rusqlite::Transaction<'a>,
}

impl TxRepos<'_> {
    pub fn decrement_capacity(&self, availability_id: &str, quantity: i32) -> DomainResult<bool> {
        Ok(queries::decrement_capacity(self.tx, availability_id, quantity)?)
    }

    pub fn increment_capacity(&self, availability_id: &str, quantity: i32) -> DomainResult<()> {
        Ok(queries::increment_capacity(self.tx, availability_id, quantity)?)
    }

    pub fn room_is_free_for_range(
        &self,
        room_id: &str,
        check_in: &NaiveDate,
        check_out: &NaiveDate,
    ) -> DomainResult<bool> {
        Ok(queries::room_is_free_for_range(self.tx, room_id, check_in, check_out)?)
    }

    pub fn update_room_status(&self, room_id: &str, status: RoomStatus) -> DomainResult<bool> {
        Ok(queries::update_room_status(self.tx, room_id, status)?)
    }

    pub fn insert_booking(&self, booking: &Booking) -> DomainResult<()> {
        Ok(queries::insert_booking(self.tx, booking)?)
    }

    /// Compare-and-set status update: only applies while the row still holds
    /// `expected`, so a concurrent transition makes this report false instead
    /// of double-applying compensations.
    pub fn transition_booking(
        &self,
        booking_id: &str,
        expected: BookingStatus,
        next: BookingStatus,
        at: &NaiveDateTime,
        cancelled_reason: Option<&str>,
    ) -> DomainResult<bool> {
        Ok(queries::transition_booking_status(
            self.tx,
            booking_id,
            expected,
            next,
            at,
            cancelled_reason,
        )?)
    }
}

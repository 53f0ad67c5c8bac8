use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rusqlite::{params, Connection};

use crate::models::{
    Availability, Booking, BookingExtraLine, BookingStatus, ExtraItem, Room, RoomStatus, Service,
    ServiceKind,
};

const DATE_FMT: &str = "%Y-%m-%d";
const TS_FMT: &str = "%Y-%m-%d %H:%M:%S";

fn parse_decimal(s: &str) -> anyhow::Result<Decimal> {
    Decimal::from_str(s).map_err(|e| anyhow::anyhow!("invalid decimal {s:?}: {e}"))
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FMT).map_err(|e| anyhow::anyhow!("invalid date {s:?}: {e}"))
}

fn parse_ts(s: &str) -> anyhow::Result<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, TS_FMT)
        .map_err(|e| anyhow::anyhow!("invalid timestamp {s:?}: {e}"))
}

// ── Services ──

pub fn get_service(conn: &Connection, id: &str) -> anyhow::Result<Option<Service>> {
    let result = conn.query_row(
        "SELECT id, establishment_id, name, base_price, duration_minutes, capacity, kind, active
         FROM services WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i32>(4)?,
                row.get::<_, i32>(5)?,
                row.get::<_, String>(6)?,
                row.get::<_, i32>(7)?,
            ))
        },
    );

    match result {
        Ok((id, establishment_id, name, base_price, duration_minutes, capacity, kind, active)) => {
            Ok(Some(Service {
                id,
                establishment_id,
                name,
                base_price: parse_decimal(&base_price)?,
                duration_minutes,
                capacity,
                kind: ServiceKind::parse(&kind)?,
                active: active != 0,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Availabilities ──

pub fn get_availability(conn: &Connection, id: &str) -> anyhow::Result<Option<Availability>> {
    let result = conn.query_row(
        "SELECT id, service_id, date, start_time, end_time, capacity, price, recurring
         FROM availabilities WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, String>(4)?,
                row.get::<_, i32>(5)?,
                row.get::<_, Option<String>>(6)?,
                row.get::<_, i32>(7)?,
            ))
        },
    );

    match result {
        Ok((id, service_id, date, start_time, end_time, capacity, price, recurring)) => {
            Ok(Some(Availability {
                id,
                service_id,
                date: parse_date(&date)?,
                start_time,
                end_time,
                capacity,
                price: price.as_deref().map(parse_decimal).transpose()?,
                recurring: recurring != 0,
            }))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Conditional decrement: only succeeds while enough capacity remains. The
/// affected-row count is the concurrency guard; zero rows means someone else
/// took the capacity first.
pub fn decrement_capacity(conn: &Connection, id: &str, quantity: i32) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE availabilities SET capacity = capacity - ?1 WHERE id = ?2 AND capacity >= ?1",
        params![quantity, id],
    )?;
    Ok(count > 0)
}

pub fn increment_capacity(conn: &Connection, id: &str, quantity: i32) -> anyhow::Result<()> {
    conn.execute(
        "UPDATE availabilities SET capacity = capacity + ?1 WHERE id = ?2",
        params![quantity, id],
    )?;
    Ok(())
}

/// Authoring-time collision probe: does any existing slot on this service
/// and date overlap the proposed `[start, end)` window?
pub fn find_overlapping_availability(
    conn: &Connection,
    service_id: &str,
    date: &NaiveDate,
    start: &str,
    end: &str,
) -> anyhow::Result<Option<String>> {
    let date_str = date.format(DATE_FMT).to_string();
    let result = conn.query_row(
        "SELECT id FROM availabilities
         WHERE service_id = ?1 AND date = ?2
           AND ((start_time <= ?3 AND end_time > ?3)
             OR (start_time < ?4 AND end_time >= ?4)
             OR (start_time >= ?3 AND end_time <= ?4))
         LIMIT 1",
        params![service_id, date_str, start, end],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Rooms ──

fn parse_room_row(row: &rusqlite::Row) -> anyhow::Result<Room> {
    let status: String = row.get(4)?;
    Ok(Room {
        id: row.get(0)?,
        service_id: row.get(1)?,
        number: row.get(2)?,
        floor: row.get(3)?,
        status: RoomStatus::parse(&status)?,
    })
}

pub fn get_room(conn: &Connection, id: &str) -> anyhow::Result<Option<Room>> {
    let result = conn.query_row(
        "SELECT id, service_id, number, floor, status FROM rooms WHERE id = ?1",
        params![id],
        |row| Ok(parse_room_row(row)),
    );

    match result {
        Ok(room) => Ok(Some(room?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Rooms that are `AVAILABLE` and have no live booking overlapping
/// `[check_in, check_out]` (inclusive overlap). Ordered by floor then number
/// so the "first free room" pick is deterministic.
pub fn find_available_rooms(
    conn: &Connection,
    service_id: &str,
    check_in: &NaiveDate,
    check_out: &NaiveDate,
) -> anyhow::Result<Vec<Room>> {
    let check_in_str = check_in.format(DATE_FMT).to_string();
    let check_out_str = check_out.format(DATE_FMT).to_string();

    let mut stmt = conn.prepare(
        "SELECT r.id, r.service_id, r.number, r.floor, r.status
         FROM rooms r
         WHERE r.service_id = ?1 AND r.status = 'AVAILABLE'
           AND NOT EXISTS (
               SELECT 1 FROM bookings b
               WHERE b.room_id = r.id
                 AND b.status NOT IN ('CANCELLED', 'CHECKED_OUT', 'NO_SHOW')
                 AND b.check_in_date <= ?3
                 AND b.check_out_date >= ?2
           )
         ORDER BY r.floor ASC, r.number ASC",
    )?;

    let rows = stmt.query_map(params![service_id, check_in_str, check_out_str], |row| {
        Ok(parse_room_row(row))
    })?;

    let mut rooms = vec![];
    for row in rows {
        rooms.push(row??);
    }
    Ok(rooms)
}

/// Authoritative in-transaction variant of the availability check for a
/// single room.
pub fn room_is_free_for_range(
    conn: &Connection,
    room_id: &str,
    check_in: &NaiveDate,
    check_out: &NaiveDate,
) -> anyhow::Result<bool> {
    let check_in_str = check_in.format(DATE_FMT).to_string();
    let check_out_str = check_out.format(DATE_FMT).to_string();

    let free: bool = conn.query_row(
        "SELECT EXISTS (
             SELECT 1 FROM rooms r
             WHERE r.id = ?1 AND r.status = 'AVAILABLE'
               AND NOT EXISTS (
                   SELECT 1 FROM bookings b
                   WHERE b.room_id = r.id
                     AND b.status NOT IN ('CANCELLED', 'CHECKED_OUT', 'NO_SHOW')
                     AND b.check_in_date <= ?3
                     AND b.check_out_date >= ?2
               )
         )",
        params![room_id, check_in_str, check_out_str],
        |row| row.get(0),
    )?;
    Ok(free)
}

pub fn update_room_status(conn: &Connection, id: &str, status: RoomStatus) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE rooms SET status = ?1 WHERE id = ?2",
        params![status.as_str(), id],
    )?;
    Ok(count > 0)
}

// ── Extra items ──

pub fn get_extra_item(conn: &Connection, id: &str) -> anyhow::Result<Option<ExtraItem>> {
    let result = conn.query_row(
        "SELECT id, service_id, name, price, max_quantity, active FROM extra_items WHERE id = ?1",
        params![id],
        |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, String>(3)?,
                row.get::<_, i32>(4)?,
                row.get::<_, i32>(5)?,
            ))
        },
    );

    match result {
        Ok((id, service_id, name, price, max_quantity, active)) => Ok(Some(ExtraItem {
            id,
            service_id,
            name,
            price: parse_decimal(&price)?,
            max_quantity,
            active: active != 0,
        })),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Roles ──

pub fn get_user_role(
    conn: &Connection,
    user_id: &str,
    establishment_id: &str,
) -> anyhow::Result<Option<String>> {
    let result = conn.query_row(
        "SELECT role FROM establishment_members WHERE user_id = ?1 AND establishment_id = ?2",
        params![user_id, establishment_id],
        |row| row.get::<_, String>(0),
    );

    match result {
        Ok(role) => Ok(Some(role)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

// ── Bookings ──

const BOOKING_COLUMNS: &str = "id, user_id, establishment_id, service_id, availability_id, \
     quantity, total_price, status, notes, check_in_date, check_out_date, room_id, \
     number_of_nights, number_of_guests, guest_name, guest_email, guest_phone, guest_document, \
     confirmed_at, cancelled_at, cancelled_reason, checked_in_at, checked_out_at, \
     created_at, updated_at";

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO bookings (id, user_id, establishment_id, service_id, availability_id,
             quantity, total_price, status, notes, check_in_date, check_out_date, room_id,
             number_of_nights, number_of_guests, guest_name, guest_email, guest_phone,
             guest_document, confirmed_at, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18, ?19, ?20, ?21)",
        params![
            booking.id,
            booking.user_id,
            booking.establishment_id,
            booking.service_id,
            booking.availability_id,
            booking.quantity,
            booking.total_price.to_string(),
            booking.status.as_str(),
            booking.notes,
            booking.check_in_date.map(|d| d.format(DATE_FMT).to_string()),
            booking.check_out_date.map(|d| d.format(DATE_FMT).to_string()),
            booking.room_id,
            booking.number_of_nights,
            booking.number_of_guests,
            booking.guest_name,
            booking.guest_email,
            booking.guest_phone,
            booking.guest_document,
            booking.confirmed_at.map(|t| t.format(TS_FMT).to_string()),
            booking.created_at.format(TS_FMT).to_string(),
            booking.updated_at.format(TS_FMT).to_string(),
        ],
    )?;

    for line in &booking.extras {
        conn.execute(
            "INSERT INTO booking_extra_items (id, booking_id, extra_item_id, quantity, price_at_booking)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                line.id,
                line.booking_id,
                line.extra_item_id,
                line.quantity,
                line.price_at_booking.to_string(),
            ],
        )?;
    }

    Ok(())
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let total_price: String = row.get(6)?;
    let status: String = row.get(7)?;
    let check_in_date: Option<String> = row.get(9)?;
    let check_out_date: Option<String> = row.get(10)?;
    let confirmed_at: Option<String> = row.get(18)?;
    let cancelled_at: Option<String> = row.get(19)?;
    let checked_in_at: Option<String> = row.get(21)?;
    let checked_out_at: Option<String> = row.get(22)?;
    let created_at: String = row.get(23)?;
    let updated_at: String = row.get(24)?;

    Ok(Booking {
        id: row.get(0)?,
        user_id: row.get(1)?,
        establishment_id: row.get(2)?,
        service_id: row.get(3)?,
        availability_id: row.get(4)?,
        quantity: row.get(5)?,
        total_price: parse_decimal(&total_price)?,
        status: BookingStatus::parse(&status)?,
        notes: row.get(8)?,
        check_in_date: check_in_date.as_deref().map(parse_date).transpose()?,
        check_out_date: check_out_date.as_deref().map(parse_date).transpose()?,
        room_id: row.get(11)?,
        number_of_nights: row.get(12)?,
        number_of_guests: row.get(13)?,
        guest_name: row.get(14)?,
        guest_email: row.get(15)?,
        guest_phone: row.get(16)?,
        guest_document: row.get(17)?,
        confirmed_at: confirmed_at.as_deref().map(parse_ts).transpose()?,
        cancelled_at: cancelled_at.as_deref().map(parse_ts).transpose()?,
        cancelled_reason: row.get(20)?,
        checked_in_at: checked_in_at.as_deref().map(parse_ts).transpose()?,
        checked_out_at: checked_out_at.as_deref().map(parse_ts).transpose()?,
        created_at: parse_ts(&created_at)?,
        updated_at: parse_ts(&updated_at)?,
        extras: vec![],
    })
}

pub fn get_booking_extras(conn: &Connection, booking_id: &str) -> anyhow::Result<Vec<BookingExtraLine>> {
    let mut stmt = conn.prepare(
        "SELECT id, booking_id, extra_item_id, quantity, price_at_booking
         FROM booking_extra_items WHERE booking_id = ?1 ORDER BY id ASC",
    )?;

    let rows = stmt.query_map(params![booking_id], |row| {
        Ok((
            row.get::<_, String>(0)?,
            row.get::<_, String>(1)?,
            row.get::<_, String>(2)?,
            row.get::<_, i32>(3)?,
            row.get::<_, String>(4)?,
        ))
    })?;

    let mut lines = vec![];
    for row in rows {
        let (id, booking_id, extra_item_id, quantity, price_at_booking) = row?;
        lines.push(BookingExtraLine {
            id,
            booking_id,
            extra_item_id,
            quantity,
            price_at_booking: parse_decimal(&price_at_booking)?,
        });
    }
    Ok(lines)
}

pub fn get_booking(conn: &Connection, id: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE id = ?1"),
        params![id],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => {
            let mut booking = booking?;
            booking.extras = get_booking_extras(conn, &booking.id)?;
            Ok(Some(booking))
        }
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_bookings_for_user(
    conn: &Connection,
    user_id: &str,
    status_filter: Option<&str>,
    limit: i64,
) -> anyhow::Result<Vec<Booking>> {
    let (sql, params_vec): (String, Vec<Box<dyn rusqlite::types::ToSql>>) = match status_filter {
        Some(status) => (
            format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE user_id = ?1 AND status = ?2 ORDER BY created_at DESC LIMIT ?3"
            ),
            vec![
                Box::new(user_id.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(status.to_string()),
                Box::new(limit),
            ],
        ),
        None => (
            format!(
                "SELECT {BOOKING_COLUMNS} FROM bookings
                 WHERE user_id = ?1 ORDER BY created_at DESC LIMIT ?2"
            ),
            vec![
                Box::new(user_id.to_string()) as Box<dyn rusqlite::types::ToSql>,
                Box::new(limit),
            ],
        ),
    };

    let mut stmt = conn.prepare(&sql)?;
    let params_refs: Vec<&dyn rusqlite::types::ToSql> =
        params_vec.iter().map(|p| p.as_ref()).collect();
    let rows = stmt.query_map(params_refs.as_slice(), |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        let mut booking = row??;
        booking.extras = get_booking_extras(conn, &booking.id)?;
        bookings.push(booking);
    }
    Ok(bookings)
}

/// Compare-and-set status write: only applies while the row still holds
/// `expected`, and stamps the timestamp column the target state owns. A zero
/// affected-row count means a concurrent transition won the race.
pub fn transition_booking_status(
    conn: &Connection,
    id: &str,
    expected: BookingStatus,
    next: BookingStatus,
    at: &NaiveDateTime,
    cancelled_reason: Option<&str>,
) -> anyhow::Result<bool> {
    let now = at.format(TS_FMT).to_string();
    let expected = expected.as_str();

    let count = match next {
        BookingStatus::Confirmed => conn.execute(
            "UPDATE bookings SET status = ?1, confirmed_at = ?2, updated_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![next.as_str(), now, id, expected],
        )?,
        BookingStatus::Cancelled => conn.execute(
            "UPDATE bookings SET status = ?1, cancelled_at = ?2, cancelled_reason = ?3, updated_at = ?2
             WHERE id = ?4 AND status = ?5",
            params![next.as_str(), now, cancelled_reason, id, expected],
        )?,
        BookingStatus::CheckedIn => conn.execute(
            "UPDATE bookings SET status = ?1, checked_in_at = ?2, updated_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![next.as_str(), now, id, expected],
        )?,
        BookingStatus::CheckedOut => conn.execute(
            "UPDATE bookings SET status = ?1, checked_out_at = ?2, updated_at = ?2
             WHERE id = ?3 AND status = ?4",
            params![next.as_str(), now, id, expected],
        )?,
        BookingStatus::Pending | BookingStatus::NoShow => conn.execute(
            "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE id = ?3 AND status = ?4",
            params![next.as_str(), now, id, expected],
        )?,
    };
    Ok(count > 0)
}

// ── Seed/authoring inserts ──

pub fn insert_establishment(conn: &Connection, id: &str, name: &str) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO establishments (id, name) VALUES (?1, ?2)",
        params![id, name],
    )?;
    Ok(())
}

pub fn insert_member(
    conn: &Connection,
    user_id: &str,
    establishment_id: &str,
    role: &str,
) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO establishment_members (user_id, establishment_id, role) VALUES (?1, ?2, ?3)",
        params![user_id, establishment_id, role],
    )?;
    Ok(())
}

pub fn insert_service(conn: &Connection, service: &Service) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO services (id, establishment_id, name, base_price, duration_minutes, capacity, kind, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            service.id,
            service.establishment_id,
            service.name,
            service.base_price.to_string(),
            service.duration_minutes,
            service.capacity,
            service.kind.as_str(),
            service.active as i32,
        ],
    )?;
    Ok(())
}

pub fn insert_availability(conn: &Connection, availability: &Availability) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO availabilities (id, service_id, date, start_time, end_time, capacity, price, recurring)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            availability.id,
            availability.service_id,
            availability.date.format(DATE_FMT).to_string(),
            availability.start_time,
            availability.end_time,
            availability.capacity,
            availability.price.map(|p| p.to_string()),
            availability.recurring as i32,
        ],
    )?;
    Ok(())
}

pub fn insert_room(conn: &Connection, room: &Room) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO rooms (id, service_id, number, floor, status) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            room.id,
            room.service_id,
            room.number,
            room.floor,
            room.status.as_str(),
        ],
    )?;
    Ok(())
}

pub fn insert_extra_item(conn: &Connection, item: &ExtraItem) -> anyhow::Result<()> {
    conn.execute(
        "INSERT INTO extra_items (id, service_id, name, price, max_quantity, active)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            item.id,
            item.service_id,
            item.name,
            item.price.to_string(),
            item.max_quantity,
            item.active as i32,
        ],
    )?;
    Ok(())
}

pub fn update_extra_item_price(conn: &Connection, id: &str, price: &Decimal) -> anyhow::Result<bool> {
    let count = conn.execute(
        "UPDATE extra_items SET price = ?1 WHERE id = ?2",
        params![price.to_string(), id],
    )?;
    Ok(count > 0)
}

use anyhow::Context;
use rusqlite::Connection;

// Embedded so that `:memory:` databases migrate too.
const MIGRATIONS: &[(&str, &str)] = &[(
    "001_initial_schema",
    "CREATE TABLE establishments (
        id TEXT PRIMARY KEY,
        name TEXT NOT NULL,
        created_at TEXT NOT NULL DEFAULT (datetime('now'))
    );

    CREATE TABLE establishment_members (
        user_id TEXT NOT NULL,
        establishment_id TEXT NOT NULL REFERENCES establishments(id),
        role TEXT NOT NULL CHECK (role IN ('OWNER', 'STAFF')),
        PRIMARY KEY (user_id, establishment_id)
    );

    CREATE TABLE services (
        id TEXT PRIMARY KEY,
        establishment_id TEXT NOT NULL REFERENCES establishments(id),
        name TEXT NOT NULL,
        base_price TEXT NOT NULL,
        duration_minutes INTEGER NOT NULL,
        capacity INTEGER NOT NULL,
        kind TEXT NOT NULL CHECK (kind IN ('SERVICE', 'HOTEL')),
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE availabilities (
        id TEXT PRIMARY KEY,
        service_id TEXT NOT NULL REFERENCES services(id),
        date TEXT NOT NULL,
        start_time TEXT NOT NULL,
        end_time TEXT NOT NULL,
        capacity INTEGER NOT NULL CHECK (capacity >= 0),
        price TEXT,
        recurring INTEGER NOT NULL DEFAULT 0
    );

    CREATE TABLE rooms (
        id TEXT PRIMARY KEY,
        service_id TEXT NOT NULL REFERENCES services(id),
        number TEXT NOT NULL,
        floor INTEGER NOT NULL DEFAULT 0,
        status TEXT NOT NULL DEFAULT 'AVAILABLE',
        UNIQUE (service_id, number)
    );

    CREATE TABLE extra_items (
        id TEXT PRIMARY KEY,
        service_id TEXT NOT NULL REFERENCES services(id),
        name TEXT NOT NULL,
        price TEXT NOT NULL,
        max_quantity INTEGER NOT NULL DEFAULT 1,
        active INTEGER NOT NULL DEFAULT 1
    );

    CREATE TABLE bookings (
        id TEXT PRIMARY KEY,
        user_id TEXT NOT NULL,
        establishment_id TEXT NOT NULL REFERENCES establishments(id),
        service_id TEXT NOT NULL REFERENCES services(id),
        availability_id TEXT NOT NULL REFERENCES availabilities(id),
        quantity INTEGER NOT NULL,
        total_price TEXT NOT NULL,
        status TEXT NOT NULL,
        notes TEXT,
        check_in_date TEXT,
        check_out_date TEXT,
        room_id TEXT REFERENCES rooms(id),
        number_of_nights INTEGER,
        number_of_guests INTEGER,
        guest_name TEXT,
        guest_email TEXT,
        guest_phone TEXT,
        guest_document TEXT,
        confirmed_at TEXT,
        cancelled_at TEXT,
        cancelled_reason TEXT,
        checked_in_at TEXT,
        checked_out_at TEXT,
        created_at TEXT NOT NULL,
        updated_at TEXT NOT NULL
    );

    CREATE INDEX idx_bookings_user ON bookings(user_id);
    CREATE INDEX idx_bookings_availability ON bookings(availability_id);
    CREATE INDEX idx_bookings_room ON bookings(room_id);

    CREATE TABLE booking_extra_items (
        id TEXT PRIMARY KEY,
        booking_id TEXT NOT NULL REFERENCES bookings(id),
        extra_item_id TEXT NOT NULL REFERENCES extra_items(id),
        quantity INTEGER NOT NULL,
        price_at_booking TEXT NOT NULL
    );

    CREATE INDEX idx_booking_extras_booking ON booking_extra_items(booking_id);",
)];

pub fn run_migrations(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS _migrations (
            name TEXT PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        );",
    )
    .context("failed to create migrations table")?;

    for (name, sql) in MIGRATIONS {
        let already_applied: bool = conn
            .query_row(
                "SELECT COUNT(*) > 0 FROM _migrations WHERE name = ?1",
                [name],
                |row| row.get(0),
            )
            .context("failed to check migration status")?;

        if already_applied {
            continue;
        }

        conn.execute_batch(sql)
            .with_context(|| format!("failed to apply migration: {name}"))?;

        conn.execute("INSERT INTO _migrations (name) VALUES (?1)", [name])
            .with_context(|| format!("failed to record migration: {name}"))?;

        tracing::info!("applied migration: {name}");
    }

    Ok(())
}

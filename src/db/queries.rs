use anyhow::Context;
use chrono::{NaiveDateTime, Utc};
use rusqlite::{params, Connection};

use crate::models::{Booking, BookingStatus, TripType};

const TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

const BOOKING_COLUMNS: &str =
    "id, pnr, username, trip_type, segment_ids, passengers, status, booking_time";

// ── Bookings ──

pub fn insert_booking(conn: &Connection, booking: &Booking) -> anyhow::Result<()> {
    let segment_ids = serde_json::to_string(&booking.segment_ids)?;
    let passengers = serde_json::to_string(&booking.passengers)?;
    let booking_time = booking.booking_time.format(TIME_FORMAT).to_string();

    conn.execute(
        "INSERT INTO bookings (id, pnr, username, trip_type, segment_ids, passengers, status, booking_time, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?8)",
        params![
            booking.id,
            booking.pnr,
            booking.username,
            booking.trip_type.as_str(),
            segment_ids,
            passengers,
            booking.status.as_str(),
            booking_time,
        ],
    )?;
    Ok(())
}

pub fn get_booking_by_pnr(conn: &Connection, pnr: &str) -> anyhow::Result<Option<Booking>> {
    let result = conn.query_row(
        &format!("SELECT {BOOKING_COLUMNS} FROM bookings WHERE pnr = ?1"),
        params![pnr],
        |row| Ok(parse_booking_row(row)),
    );

    match result {
        Ok(booking) => Ok(Some(booking?)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

pub fn get_all_bookings(conn: &Connection) -> anyhow::Result<Vec<Booking>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {BOOKING_COLUMNS} FROM bookings ORDER BY booking_time DESC, pnr ASC"
    ))?;

    let rows = stmt.query_map([], |row| Ok(parse_booking_row(row)))?;

    let mut bookings = vec![];
    for row in rows {
        bookings.push(row??);
    }
    Ok(bookings)
}

/// Moves a booking to `next` only while it is still in `expected`. Returns
/// false when the row was missing or had already moved on.
pub fn update_booking_status(
    conn: &Connection,
    pnr: &str,
    expected: BookingStatus,
    next: BookingStatus,
) -> anyhow::Result<bool> {
    let now = Utc::now().naive_utc().format(TIME_FORMAT).to_string();
    let count = conn.execute(
        "UPDATE bookings SET status = ?1, updated_at = ?2 WHERE pnr = ?3 AND status = ?4",
        params![next.as_str(), now, pnr, expected.as_str()],
    )?;
    Ok(count > 0)
}

/// True only for a UNIQUE index violation. NOT NULL, CHECK and primary-key
/// failures are reported separately by SQLite and do not match.
pub fn is_unique_violation(err: &anyhow::Error) -> bool {
    matches!(
        err.downcast_ref::<rusqlite::Error>(),
        Some(rusqlite::Error::SqliteFailure(e, _)) if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn parse_booking_row(row: &rusqlite::Row) -> anyhow::Result<Booking> {
    let id: String = row.get(0)?;
    let pnr: String = row.get(1)?;
    let username: String = row.get(2)?;
    let trip_type_str: String = row.get(3)?;
    let segment_ids_json: String = row.get(4)?;
    let passengers_json: String = row.get(5)?;
    let status_str: String = row.get(6)?;
    let booking_time_str: String = row.get(7)?;

    let trip_type = TripType::parse(&trip_type_str)
        .with_context(|| format!("unknown trip type for {pnr}: {trip_type_str}"))?;
    let status = BookingStatus::parse(&status_str)
        .with_context(|| format!("unknown booking status for {pnr}: {status_str}"))?;
    let booking_time = NaiveDateTime::parse_from_str(&booking_time_str, TIME_FORMAT)
        .with_context(|| format!("invalid booking time for {pnr}: {booking_time_str}"))?;

    Ok(Booking {
        id,
        pnr,
        username,
        trip_type,
        segment_ids: serde_json::from_str(&segment_ids_json)
            .context("failed to decode segment ids")?,
        passengers: serde_json::from_str(&passengers_json)
            .context("failed to decode passengers")?,
        status,
        booking_time,
    })
}

use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use rusqlite::Connection;

use crate::db::queries;
use crate::errors::StoreError;
use crate::models::{Booking, BookingStatus, NewBooking};

/// Persistence for booking records. Single-record consistency only; nothing
/// here spans more than one booking.
#[async_trait]
pub trait BookingStore: Send + Sync {
    /// Writes a new booking with status `Booked` and a store-assigned id.
    async fn save(&self, booking: NewBooking) -> Result<Booking, StoreError>;

    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Booking>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Booking>, StoreError>;

    /// Compare-and-swap on the status column.
    async fn update_status(
        &self,
        pnr: &str,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<bool, StoreError>;
}

pub struct SqliteBookingStore {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteBookingStore {
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Arc::new(Mutex::new(conn)),
        }
    }

    pub fn open(path: &str) -> anyhow::Result<Self> {
        Ok(Self::new(super::init_db(path)?))
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, StoreError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> anyhow::Result<T> + Send + 'static,
    {
        let conn = Arc::clone(&self.conn);
        tokio::task::spawn_blocking(move || {
            let conn = conn
                .lock()
                .map_err(|_| anyhow!("database connection mutex poisoned"))?;
            f(&conn)
        })
        .await
        .map_err(|e| StoreError::Database(anyhow!("database task failed: {e}")))?
        .map_err(StoreError::Database)
    }
}

#[async_trait]
impl BookingStore for SqliteBookingStore {
    async fn save(&self, booking: NewBooking) -> Result<Booking, StoreError> {
        let record = Booking {
            id: uuid::Uuid::new_v4().to_string(),
            username: booking.username,
            trip_type: booking.trip_type,
            segment_ids: booking.segment_ids,
            passengers: booking.passengers,
            pnr: booking.pnr,
            status: BookingStatus::Booked,
            booking_time: booking.booking_time,
        };

        let pnr = record.pnr.clone();
        let result = self
            .with_conn(move |conn| queries::insert_booking(conn, &record).map(|_| record))
            .await;

        match result {
            Err(StoreError::Database(e)) if queries::is_unique_violation(&e) => {
                Err(StoreError::DuplicatePnr(pnr))
            }
            other => other,
        }
    }

    async fn find_by_pnr(&self, pnr: &str) -> Result<Option<Booking>, StoreError> {
        let pnr = pnr.to_string();
        self.with_conn(move |conn| queries::get_booking_by_pnr(conn, &pnr))
            .await
    }

    async fn find_all(&self) -> Result<Vec<Booking>, StoreError> {
        self.with_conn(queries::get_all_bookings).await
    }

    async fn update_status(
        &self,
        pnr: &str,
        expected: BookingStatus,
        next: BookingStatus,
    ) -> Result<bool, StoreError> {
        let pnr = pnr.to_string();
        self.with_conn(move |conn| queries::update_booking_status(conn, &pnr, expected, next))
            .await
    }
}

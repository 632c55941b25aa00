use std::sync::Arc;

use chrono::{Duration, NaiveDateTime, Utc};

use crate::db::BookingStore;
use crate::errors::BookingError;
use crate::models::{Booking, BookingStatus, FlightSegment};
use crate::services::availability::AvailabilityChecker;
use crate::services::reservation::ReservationCoordinator;

pub struct CancellationWorkflow {
    store: Arc<dyn BookingStore>,
    availability: AvailabilityChecker,
    coordinator: Arc<ReservationCoordinator>,
    lead_time: Duration,
}

impl CancellationWorkflow {
    pub fn new(
        store: Arc<dyn BookingStore>,
        availability: AvailabilityChecker,
        coordinator: Arc<ReservationCoordinator>,
        lead_time: Duration,
    ) -> Self {
        Self {
            store,
            availability,
            coordinator,
            lead_time,
        }
    }

    pub async fn cancel(&self, pnr: &str, attempt_id: &str) -> Result<Booking, BookingError> {
        self.cancel_at(pnr, Utc::now().naive_utc(), attempt_id).await
    }

    /// Cancels the booking as of `now`. Seat releases are best-effort: the
    /// booking is closed even when some of them fail.
    pub async fn cancel_at(
        &self,
        pnr: &str,
        now: NaiveDateTime,
        attempt_id: &str,
    ) -> Result<Booking, BookingError> {
        let booking = self
            .store
            .find_by_pnr(pnr)
            .await?
            .ok_or_else(|| BookingError::PnrNotFound(pnr.to_string()))?;

        if booking.is_cancelled() {
            return Err(BookingError::AlreadyCancelled(booking.pnr));
        }

        // Schedules move, so departure times are re-read rather than cached.
        let segments = self.availability.fetch(&booking.segment_ids).await?;
        self.check_lead_time(&booking.pnr, &segments, now)?;

        let seats = booking.seat_count() as u32;
        let report = self
            .coordinator
            .release(&booking.segment_ids, seats, attempt_id)
            .await;
        if !report.is_clean() {
            tracing::warn!(
                pnr = %booking.pnr,
                failed = report.failed.len(),
                attempted = report.attempted(),
                "closing booking with unreleased seats"
            );
        }

        let transitioned = self
            .store
            .update_status(&booking.pnr, BookingStatus::Booked, BookingStatus::Cancelled)
            .await?;
        if !transitioned {
            tracing::error!(pnr = %booking.pnr, "booking was cancelled concurrently; seats may have been released twice");
            return Err(BookingError::AlreadyCancelled(booking.pnr));
        }

        tracing::info!(pnr = %booking.pnr, seats, "booking cancelled");
        Ok(Booking {
            status: BookingStatus::Cancelled,
            ..booking
        })
    }

    fn check_lead_time(
        &self,
        pnr: &str,
        segments: &[FlightSegment],
        now: NaiveDateTime,
    ) -> Result<(), BookingError> {
        let Some(earliest) = segments.iter().map(|s| s.departure_time).min() else {
            return Ok(());
        };

        let remaining = earliest - now;
        if remaining < self.lead_time {
            return Err(BookingError::CancellationWindowViolation {
                pnr: pnr.to_string(),
                minutes_remaining: remaining.num_minutes(),
                lead_hours: self.lead_time.num_hours(),
            });
        }
        Ok(())
    }
}

use std::sync::Arc;

use chrono::{SubsecRound, Utc};

use crate::db::BookingStore;
use crate::errors::{BookingError, InventoryError, StoreError};
use crate::models::{Booking, BookingRequest, FlightSegment, NewBooking};
use crate::services::dispatch::{RemoteCallPool, SegmentOutcome};
use crate::services::inventory::InventoryService;
use crate::services::pnr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeatAction {
    Reserve,
    Release,
}

impl SeatAction {
    fn as_str(&self) -> &'static str {
        match self {
            SeatAction::Reserve => "reserve",
            SeatAction::Release => "release",
        }
    }
}

/// What happened to a best-effort release batch. Failures are kept for
/// logging only; callers never propagate them.
#[derive(Debug, Default)]
pub struct ReleaseReport {
    pub released: Vec<String>,
    pub failed: Vec<(String, InventoryError)>,
}

impl ReleaseReport {
    pub fn attempted(&self) -> usize {
        self.released.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Drives seat reservation across every segment of an itinerary.
///
/// There is no transaction spanning the segment owners. A partial failure is
/// answered with a release on every segment, and those releases are not
/// retried. Between a successful reserve and the booking write, seats are
/// held with no booking record pointing at them.
pub struct ReservationCoordinator {
    inventory: Arc<dyn InventoryService>,
    store: Arc<dyn BookingStore>,
    pool: RemoteCallPool,
    pnr_max_attempts: u32,
}

impl ReservationCoordinator {
    pub fn new(
        inventory: Arc<dyn InventoryService>,
        store: Arc<dyn BookingStore>,
        pool: RemoteCallPool,
        pnr_max_attempts: u32,
    ) -> Self {
        Self {
            inventory,
            store,
            pool,
            pnr_max_attempts: pnr_max_attempts.max(1),
        }
    }

    /// Reserves `request.passengers.len()` seats on each segment, then writes
    /// the booking. Segments must already have passed availability checks.
    pub async fn reserve(
        &self,
        request: &BookingRequest,
        segments: &[FlightSegment],
        attempt_id: &str,
    ) -> Result<Booking, BookingError> {
        let seats = request.passengers.len() as u32;
        let segment_ids: Vec<String> = segments.iter().map(|s| s.id.clone()).collect();

        let outcomes = self
            .run_batch(SeatAction::Reserve, &segment_ids, seats, attempt_id)
            .await;

        let failure = outcomes
            .into_iter()
            .find_map(|SegmentOutcome { segment_id, result }| {
                result
                    .err()
                    .map(|source| BookingError::ReservationFailed { segment_id, source })
            });

        if let Some(err) = failure {
            tracing::warn!(
                attempt_id,
                error = %err,
                "reservation failed, releasing seats on every segment"
            );
            self.release(&segment_ids, seats, attempt_id).await;
            return Err(err);
        }

        self.persist(request, segment_ids).await
    }

    /// Best-effort release of `seats` on every segment. Always waits for the
    /// whole batch; individual failures are logged and returned in the report.
    pub async fn release(&self, segment_ids: &[String], seats: u32, attempt_id: &str) -> ReleaseReport {
        let outcomes = self
            .run_batch(SeatAction::Release, segment_ids, seats, attempt_id)
            .await;

        let mut report = ReleaseReport::default();
        for SegmentOutcome { segment_id, result } in outcomes {
            match result {
                Ok(()) => report.released.push(segment_id),
                Err(err) => {
                    tracing::warn!(
                        attempt_id,
                        segment_id = %segment_id,
                        seats,
                        error = %err,
                        "seat release failed, ignoring"
                    );
                    report.failed.push((segment_id, err));
                }
            }
        }
        report
    }

    async fn run_batch(
        &self,
        action: SeatAction,
        segment_ids: &[String],
        seats: u32,
        attempt_id: &str,
    ) -> Vec<SegmentOutcome<()>> {
        let inventory = Arc::clone(&self.inventory);
        let attempt_id = attempt_id.to_string();

        self.pool
            .join_all(segment_ids, move |segment_id| {
                let inventory = Arc::clone(&inventory);
                let key = format!("{attempt_id}:{segment_id}:{}", action.as_str());
                async move {
                    match action {
                        SeatAction::Reserve => inventory.reserve(&segment_id, seats, &key).await,
                        SeatAction::Release => inventory.release(&segment_id, seats, &key).await,
                    }
                }
            })
            .await
    }

    async fn persist(
        &self,
        request: &BookingRequest,
        segment_ids: Vec<String>,
    ) -> Result<Booking, BookingError> {
        let booking_time = Utc::now().naive_utc().trunc_subsecs(0);

        for attempt in 1..=self.pnr_max_attempts {
            let draft = NewBooking {
                username: request.username.clone(),
                trip_type: request.trip_type,
                segment_ids: segment_ids.clone(),
                passengers: request.passengers.clone(),
                pnr: pnr::generate(),
                booking_time,
            };

            match self.store.save(draft).await {
                Ok(booking) => {
                    tracing::info!(pnr = %booking.pnr, segments = ?booking.segment_ids, "booking created");
                    return Ok(booking);
                }
                Err(StoreError::DuplicatePnr(pnr)) => {
                    tracing::warn!(pnr = %pnr, attempt, "pnr collision, drawing a new code");
                }
                Err(err) => {
                    tracing::error!(
                        segments = ?segment_ids,
                        error = %err,
                        "seats are reserved but the booking could not be saved"
                    );
                    return Err(BookingError::PersistenceInconsistency {
                        segment_ids,
                        reason: err.to_string(),
                    });
                }
            }
        }

        tracing::error!(
            segments = ?segment_ids,
            attempts = self.pnr_max_attempts,
            "seats are reserved but no unique pnr could be issued"
        );
        Err(BookingError::PersistenceInconsistency {
            segment_ids,
            reason: format!("no unique pnr after {} attempts", self.pnr_max_attempts),
        })
    }
}

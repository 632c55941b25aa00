use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AppConfig, MAX_LEAD_HOURS};
use crate::db::BookingStore;
use crate::errors::BookingError;
use crate::models::{Booking, BookingRequest, BookingResult, CancellationResult, TicketView};
use crate::services::availability::AvailabilityChecker;
use crate::services::cancellation::CancellationWorkflow;
use crate::services::dispatch::RemoteCallPool;
use crate::services::inventory::InventoryService;
use crate::services::reservation::ReservationCoordinator;
use crate::services::validator;

/// Entry point used by the HTTP layer: create, read, cancel and list bookings.
pub struct BookingService {
    store: Arc<dyn BookingStore>,
    availability: AvailabilityChecker,
    coordinator: Arc<ReservationCoordinator>,
    cancellation: CancellationWorkflow,
}

impl BookingService {
    pub fn new(
        config: &AppConfig,
        inventory: Arc<dyn InventoryService>,
        store: Arc<dyn BookingStore>,
    ) -> Self {
        let pool = RemoteCallPool::from_config(config);
        let availability = AvailabilityChecker::new(Arc::clone(&inventory), pool.clone());
        let coordinator = Arc::new(ReservationCoordinator::new(
            inventory,
            Arc::clone(&store),
            pool,
            config.pnr_max_attempts,
        ));
        let cancellation = CancellationWorkflow::new(
            Arc::clone(&store),
            availability.clone(),
            Arc::clone(&coordinator),
            lead_time(config),
        );

        Self {
            store,
            availability,
            coordinator,
            cancellation,
        }
    }

    pub async fn create_booking(&self, request: BookingRequest) -> Result<BookingResult, BookingError> {
        let attempt_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!(
            "create_booking",
            attempt_id = %attempt_id,
            username = %request.username,
            trip_type = %request.trip_type,
        );

        async {
            validator::validate_request(&request)?;

            let segments = self
                .availability
                .fetch_bookable(request.trip_type, &request.segment_ids, request.passengers.len())
                .await?;

            let booking = self
                .coordinator
                .reserve(&request, &segments, &attempt_id)
                .await?;

            Ok::<_, BookingError>(BookingResult::from(&booking))
        }
        .instrument(span)
        .await
    }

    /// Booking details together with the current state of each segment.
    pub async fn get_ticket(&self, pnr: &str) -> Result<TicketView, BookingError> {
        let booking = self.find(pnr).await?;
        let segments = self.availability.fetch(&booking.segment_ids).await?;
        Ok(TicketView::new(booking, segments))
    }

    pub async fn cancel_booking(&self, pnr: &str) -> Result<CancellationResult, BookingError> {
        let attempt_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("cancel_booking", attempt_id = %attempt_id, pnr = %pnr);

        let booking = self
            .cancellation
            .cancel(pnr, &attempt_id)
            .instrument(span)
            .await?;
        Ok(cancellation_result(booking))
    }

    /// `cancel_booking` with an explicit clock, for callers that need to pin "now".
    pub async fn cancel_booking_at(
        &self,
        pnr: &str,
        now: NaiveDateTime,
    ) -> Result<CancellationResult, BookingError> {
        let attempt_id = Uuid::new_v4().to_string();
        let span = tracing::info_span!("cancel_booking", attempt_id = %attempt_id, pnr = %pnr);

        let booking = self
            .cancellation
            .cancel_at(pnr, now, &attempt_id)
            .instrument(span)
            .await?;
        Ok(cancellation_result(booking))
    }

    pub async fn list_bookings(&self) -> Result<Vec<Booking>, BookingError> {
        Ok(self.store.find_all().await?)
    }

    async fn find(&self, pnr: &str) -> Result<Booking, BookingError> {
        self.store
            .find_by_pnr(pnr)
            .await?
            .ok_or_else(|| BookingError::PnrNotFound(pnr.to_string()))
    }
}

/// Out-of-range lead times are clamped to `0..=MAX_LEAD_HOURS`.
fn lead_time(config: &AppConfig) -> Duration {
    let hours = config.cancellation_lead_hours.clamp(0, MAX_LEAD_HOURS);
    if hours != config.cancellation_lead_hours {
        tracing::warn!(
            configured = config.cancellation_lead_hours,
            using = hours,
            "cancellation lead time out of range, clamping"
        );
    }
    Duration::hours(hours)
}

fn cancellation_result(booking: Booking) -> CancellationResult {
    CancellationResult {
        pnr: booking.pnr,
        status: booking.status,
        message: "booking.cancelled".to_string(),
    }
}

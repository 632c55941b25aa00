use std::sync::Arc;

use crate::errors::{BookingError, FetchError};
use crate::models::{FlightSegment, TripType};
use crate::services::dispatch::RemoteCallPool;
use crate::services::inventory::InventoryService;
use crate::services::validator;

/// Resolves segment ids to their current state on the inventory service.
#[derive(Clone)]
pub struct AvailabilityChecker {
    inventory: Arc<dyn InventoryService>,
    pool: RemoteCallPool,
}

impl AvailabilityChecker {
    pub fn new(inventory: Arc<dyn InventoryService>, pool: RemoteCallPool) -> Self {
        Self { inventory, pool }
    }

    /// Looks every segment up concurrently. The output follows the order of
    /// `segment_ids`; the first lookup to fail decides the error.
    pub async fn fetch(&self, segment_ids: &[String]) -> Result<Vec<FlightSegment>, FetchError> {
        let inventory = Arc::clone(&self.inventory);

        self.pool
            .try_join_all(segment_ids, move |segment_id| {
                let inventory = Arc::clone(&inventory);
                async move { inventory.get_segment(&segment_id).await }
            })
            .await
            .map_err(|(segment_id, err)| {
                tracing::warn!(segment_id = %segment_id, error = %err, "segment lookup failed");
                FetchError::from_inventory(&segment_id, err)
            })
    }

    /// `fetch` followed by the checks that need resolved segments: route
    /// continuity for the trip type and enough free seats for `seats`.
    pub async fn fetch_bookable(
        &self,
        trip_type: TripType,
        segment_ids: &[String],
        seats: usize,
    ) -> Result<Vec<FlightSegment>, BookingError> {
        let segments = self.fetch(segment_ids).await?;

        validator::validate_route(trip_type, &segments)?;
        validator::check_seats(&segments, seats)?;

        Ok(segments)
    }
}

pub mod http;

use async_trait::async_trait;

use crate::errors::InventoryError;
use crate::models::FlightSegment;

pub use http::HttpInventoryClient;

/// The remote owner of flight segments and their seat counts. Seat counts are
/// only ever changed through `reserve` and `release`.
///
/// `idempotency_key` is unique per operation attempt, segment and action.
/// Implementations may forward it; nothing downstream is assumed to dedupe on it.
#[async_trait]
pub trait InventoryService: Send + Sync {
    async fn get_segment(&self, segment_id: &str) -> Result<FlightSegment, InventoryError>;

    async fn reserve(
        &self,
        segment_id: &str,
        count: u32,
        idempotency_key: &str,
    ) -> Result<(), InventoryError>;

    async fn release(
        &self,
        segment_id: &str,
        count: u32,
        idempotency_key: &str,
    ) -> Result<(), InventoryError>;
}

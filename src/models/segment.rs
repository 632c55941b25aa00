use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One flight leg as reported by the inventory service. `available_seats` is a
/// snapshot and may already be stale when it is read.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightSegment {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flight_number: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub airline: Option<String>,
    pub source: String,
    pub destination: String,
    pub departure_time: NaiveDateTime,
    pub arrival_time: NaiveDateTime,
    pub total_seats: u32,
    pub available_seats: u32,
    pub price: f64,
}

impl FlightSegment {
    pub fn departs_from(&self, city: &str) -> bool {
        self.source.eq_ignore_ascii_case(city)
    }

    pub fn arrives_at(&self, city: &str) -> bool {
        self.destination.eq_ignore_ascii_case(city)
    }
}

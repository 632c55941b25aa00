use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use super::{Booking, BookingStatus, FlightSegment, Passenger, TripType};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingRequest {
    pub username: String,
    pub trip_type: TripType,
    #[serde(rename = "flightIds")]
    pub segment_ids: Vec<String>,
    pub passengers: Vec<Passenger>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResult {
    pub pnr: String,
    pub message: String,
    pub booking_id: String,
    #[serde(rename = "flightIds")]
    pub segment_ids: Vec<String>,
}

impl From<&Booking> for BookingResult {
    fn from(booking: &Booking) -> Self {
        Self {
            pnr: booking.pnr.clone(),
            message: "booking.created".to_string(),
            booking_id: booking.id.clone(),
            segment_ids: booking.segment_ids.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationResult {
    pub pnr: String,
    pub status: BookingStatus,
    pub message: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketView {
    pub pnr: String,
    pub username: String,
    pub trip_type: TripType,
    #[serde(rename = "flightIds")]
    pub segment_ids: Vec<String>,
    pub passengers: Vec<Passenger>,
    pub booking_time: NaiveDateTime,
    pub status: BookingStatus,
    pub segments: Vec<FlightSegment>,
}

impl TicketView {
    pub fn new(booking: Booking, segments: Vec<FlightSegment>) -> Self {
        Self {
            pnr: booking.pnr,
            username: booking.username,
            trip_type: booking.trip_type,
            segment_ids: booking.segment_ids,
            passengers: booking.passengers,
            booking_time: booking.booking_time,
            status: booking.status,
            segments,
        }
    }
}

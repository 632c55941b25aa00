use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TripType {
    OneWay,
    RoundTrip,
    MultiCity,
}

impl TripType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TripType::OneWay => "ONE_WAY",
            TripType::RoundTrip => "ROUND_TRIP",
            TripType::MultiCity => "MULTI_CITY",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "ONE_WAY" => Some(TripType::OneWay),
            "ROUND_TRIP" => Some(TripType::RoundTrip),
            "MULTI_CITY" => Some(TripType::MultiCity),
            _ => None,
        }
    }
}

impl std::fmt::Display for TripType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Only ever moves `Booked -> Cancelled`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Booked,
    Cancelled,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Booked => "BOOKED",
            BookingStatus::Cancelled => "CANCELLED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "BOOKED" => Some(BookingStatus::Booked),
            "CANCELLED" => Some(BookingStatus::Cancelled),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Gender {
    Male,
    Female,
    Other,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MealType {
    Veg,
    NonVeg,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Passenger {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    pub meal_type: MealType,
}

/// A booking that has not been written yet; the store assigns its `id`.
#[derive(Debug, Clone)]
pub struct NewBooking {
    pub username: String,
    pub trip_type: TripType,
    pub segment_ids: Vec<String>,
    pub passengers: Vec<Passenger>,
    pub pnr: String,
    pub booking_time: NaiveDateTime,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: String,
    pub username: String,
    pub trip_type: TripType,
    #[serde(rename = "flightIds")]
    pub segment_ids: Vec<String>,
    pub passengers: Vec<Passenger>,
    pub pnr: String,
    pub status: BookingStatus,
    pub booking_time: NaiveDateTime,
}

impl Booking {
    pub fn seat_count(&self) -> usize {
        self.passengers.len()
    }

    pub fn is_cancelled(&self) -> bool {
        self.status == BookingStatus::Cancelled
    }
}

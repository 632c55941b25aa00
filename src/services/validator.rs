//! Trip-shape rules. Nothing here performs I/O.

use crate::errors::{BookingError, SegmentTopologyError};
use crate::models::{BookingRequest, FlightSegment, Passenger, TripType};

pub const MAX_PASSENGERS: usize = 9;

/// Segment count rules for a trip type. Runs before any remote lookup.
pub fn validate(trip_type: TripType, segment_ids: &[String]) -> Result<(), SegmentTopologyError> {
    let actual = segment_ids.len();
    let (ok, expected) = match trip_type {
        TripType::OneWay => (actual == 1, "exactly 1"),
        TripType::RoundTrip => (actual == 2, "exactly 2"),
        TripType::MultiCity => (actual >= 2, "at least 2"),
    };

    if ok {
        Ok(())
    } else {
        Err(SegmentTopologyError::CardinalityMismatch {
            trip_type,
            expected,
            actual,
        })
    }
}

/// Route continuity over resolved segments, in itinerary order. City names
/// compare case-insensitively.
pub fn validate_route(
    trip_type: TripType,
    segments: &[FlightSegment],
) -> Result<(), SegmentTopologyError> {
    match trip_type {
        TripType::OneWay => Ok(()),
        TripType::RoundTrip => match segments {
            [outbound, inbound] => {
                if outbound.arrives_at(&inbound.source) && outbound.departs_from(&inbound.destination) {
                    Ok(())
                } else {
                    Err(SegmentTopologyError::DisconnectedRoute {
                        trip_type,
                        index: 0,
                    })
                }
            }
            _ => Err(SegmentTopologyError::CardinalityMismatch {
                trip_type,
                expected: "exactly 2",
                actual: segments.len(),
            }),
        },
        TripType::MultiCity => {
            match segments
                .windows(2)
                .position(|pair| !pair[0].arrives_at(&pair[1].source))
            {
                Some(index) => Err(SegmentTopologyError::DisconnectedRoute { trip_type, index }),
                None => Ok(()),
            }
        }
    }
}

pub fn validate_passengers(passengers: &[Passenger]) -> Result<(), BookingError> {
    if passengers.is_empty() || passengers.len() > MAX_PASSENGERS {
        return Err(BookingError::InvalidPassengerCount(passengers.len()));
    }

    if let Some(index) = passengers.iter().position(|p| p.name.trim().is_empty()) {
        return Err(BookingError::InvalidRequest(format!(
            "passengers[{index}].name is required"
        )));
    }

    Ok(())
}

/// Everything that can be checked on a booking request before contacting the
/// inventory service.
pub fn validate_request(request: &BookingRequest) -> Result<(), BookingError> {
    if request.username.trim().is_empty() {
        return Err(BookingError::InvalidRequest("username is required".to_string()));
    }

    if let Some(index) = request.segment_ids.iter().position(|id| id.trim().is_empty()) {
        return Err(BookingError::InvalidRequest(format!(
            "flightIds[{index}] cannot be empty"
        )));
    }

    validate(request.trip_type, &request.segment_ids)?;
    validate_passengers(&request.passengers)
}

/// Every segment must advertise at least `seats` free seats. The first short
/// segment in itinerary order is reported.
pub fn check_seats(segments: &[FlightSegment], seats: usize) -> Result<(), BookingError> {
    match segments
        .iter()
        .find(|segment| (segment.available_seats as usize) < seats)
    {
        Some(segment) => Err(BookingError::InsufficientSeats {
            segment_id: segment.id.clone(),
            available: segment.available_seats,
            requested: seats,
        }),
        None => Ok(()),
    }
}

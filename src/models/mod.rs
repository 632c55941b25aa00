pub mod booking;
pub mod segment;
pub mod ticket;

pub use booking::{Booking, BookingStatus, Gender, MealType, NewBooking, Passenger, TripType};
pub use segment::FlightSegment;
pub use ticket::{BookingRequest, BookingResult, CancellationResult, TicketView};

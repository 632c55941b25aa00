pub mod availability;
pub mod booking;
pub mod cancellation;
pub mod dispatch;
pub mod inventory;
pub mod pnr;
pub mod reservation;
pub mod validator;

pub use booking::BookingService;

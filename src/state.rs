use crate::config::AppConfig;
use crate::services::BookingService;

pub struct AppState {
    pub config: AppConfig,
    pub bookings: BookingService,
}

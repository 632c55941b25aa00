pub mod bookings;
pub mod health;

use std::sync::Arc;

use axum::routing::get;
use axum::Router;

use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health))
        .route(
            "/api/bookings",
            get(bookings::list_bookings).post(bookings::create_booking),
        )
        .route(
            "/api/bookings/:pnr",
            get(bookings::get_ticket).delete(bookings::cancel_booking),
        )
        .with_state(state)
}

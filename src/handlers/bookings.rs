use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use crate::errors::BookingError;
use crate::models::{Booking, BookingRequest, BookingResult, CancellationResult, TicketView};
use crate::state::AppState;

// POST /api/bookings
pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<BookingRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<BookingResult>), BookingError> {
    let Json(request) = payload?;
    let result = state.bookings.create_booking(request).await?;
    Ok((StatusCode::CREATED, Json(result)))
}

// GET /api/bookings/:pnr
pub async fn get_ticket(
    State(state): State<Arc<AppState>>,
    Path(pnr): Path<String>,
) -> Result<Json<TicketView>, BookingError> {
    let ticket = state.bookings.get_ticket(pnr.trim()).await?;
    Ok(Json(ticket))
}

// DELETE /api/bookings/:pnr
pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    Path(pnr): Path<String>,
) -> Result<Json<CancellationResult>, BookingError> {
    let result = state.bookings.cancel_booking(pnr.trim()).await?;
    Ok(Json(result))
}

// GET /api/bookings
pub async fn list_bookings(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Booking>>, BookingError> {
    let bookings = state.bookings.list_bookings().await?;
    Ok(Json(bookings))
}

use std::time::Duration;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use crate::models::TripType;

/// Failure of a single call against the flight inventory service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InventoryError {
    #[error("segment not found")]
    NotFound,

    #[error("inventory service rejected the request ({status}): {body}")]
    Rejected { status: u16, body: String },

    #[error("inventory service unavailable: {0}")]
    Unavailable(String),

    #[error("inventory call timed out after {0:?}")]
    Timeout(Duration),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SegmentTopologyError {
    #[error("{trip_type} requires {expected} segment(s), got {actual}")]
    CardinalityMismatch {
        trip_type: TripType,
        expected: &'static str,
        actual: usize,
    },

    #[error("{trip_type} segments are not connected at index {index}")]
    DisconnectedRoute { trip_type: TripType, index: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchError {
    #[error("segment not found: {0}")]
    SegmentNotFound(String),

    #[error("segment service unavailable for {segment_id}: {reason}")]
    SegmentServiceUnavailable { segment_id: String, reason: String },
}

impl FetchError {
    pub fn from_inventory(segment_id: &str, err: InventoryError) -> Self {
        match err {
            InventoryError::NotFound => FetchError::SegmentNotFound(segment_id.to_string()),
            other => FetchError::SegmentServiceUnavailable {
                segment_id: segment_id.to_string(),
                reason: other.to_string(),
            },
        }
    }

    pub fn segment_id(&self) -> &str {
        match self {
            FetchError::SegmentNotFound(id) => id,
            FetchError::SegmentServiceUnavailable { segment_id, .. } => segment_id,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("pnr {0} already exists")]
    DuplicatePnr(String),

    #[error("database error: {0:#}")]
    Database(anyhow::Error),
}

/// How an error should be treated by callers and which transport status it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Downstream,
    Internal,
}

impl ErrorKind {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Downstream => StatusCode::SERVICE_UNAVAILABLE,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error(transparent)]
    Topology(#[from] SegmentTopologyError),

    #[error("invalid request: {0}")]
    InvalidRequest(String),

    #[error("a booking needs between 1 and 9 passengers, got {0}")]
    InvalidPassengerCount(usize),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error("not enough seats on segment {segment_id}: {available} available, {requested} requested")]
    InsufficientSeats {
        segment_id: String,
        available: u32,
        requested: usize,
    },

    #[error("seat reservation failed for segment {segment_id}: {source}")]
    ReservationFailed {
        segment_id: String,
        #[source]
        source: InventoryError,
    },

    #[error("pnr not found: {0}")]
    PnrNotFound(String),

    #[error("booking {0} is already cancelled")]
    AlreadyCancelled(String),

    #[error("booking {pnr} departs in {minutes_remaining} minutes; cancellation needs {lead_hours}h notice")]
    CancellationWindowViolation {
        pnr: String,
        minutes_remaining: i64,
        lead_hours: i64,
    },

    #[error("seats reserved on {segment_ids:?} but the booking could not be saved: {reason}")]
    PersistenceInconsistency {
        segment_ids: Vec<String>,
        reason: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BookingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            BookingError::Topology(_)
            | BookingError::InvalidRequest(_)
            | BookingError::InvalidPassengerCount(_) => ErrorKind::Validation,
            BookingError::InsufficientSeats { .. }
            | BookingError::AlreadyCancelled(_)
            | BookingError::CancellationWindowViolation { .. } => ErrorKind::Conflict,
            BookingError::PnrNotFound(_) | BookingError::Fetch(FetchError::SegmentNotFound(_)) => {
                ErrorKind::NotFound
            }
            BookingError::Fetch(FetchError::SegmentServiceUnavailable { .. })
            | BookingError::ReservationFailed { .. } => ErrorKind::Downstream,
            BookingError::PersistenceInconsistency { .. } | BookingError::Store(_) => {
                ErrorKind::Internal
            }
        }
    }

    /// Stable machine-readable tag returned to clients alongside the message.
    pub fn code(&self) -> &'static str {
        match self {
            BookingError::Topology(SegmentTopologyError::CardinalityMismatch { .. }) => {
                "CARDINALITY_MISMATCH"
            }
            BookingError::Topology(SegmentTopologyError::DisconnectedRoute { .. }) => {
                "DISCONNECTED_ROUTE"
            }
            BookingError::InvalidRequest(_) => "INVALID_REQUEST",
            BookingError::InvalidPassengerCount(_) => "INVALID_PASSENGER_COUNT",
            BookingError::Fetch(FetchError::SegmentNotFound(_)) => "SEGMENT_NOT_FOUND",
            BookingError::Fetch(FetchError::SegmentServiceUnavailable { .. }) => {
                "SEGMENT_SERVICE_UNAVAILABLE"
            }
            BookingError::InsufficientSeats { .. } => "INSUFFICIENT_SEATS",
            BookingError::ReservationFailed { .. } => "RESERVATION_FAILED",
            BookingError::PnrNotFound(_) => "PNR_NOT_FOUND",
            BookingError::AlreadyCancelled(_) => "ALREADY_CANCELLED",
            BookingError::CancellationWindowViolation { .. } => "CANCELLATION_WINDOW_VIOLATION",
            BookingError::PersistenceInconsistency { .. } => "PERSISTENCE_INCONSISTENCY",
            BookingError::Store(_) => "INTERNAL_ERROR",
        }
    }
}

impl From<JsonRejection> for BookingError {
    fn from(rejection: JsonRejection) -> Self {
        BookingError::InvalidRequest(rejection.body_text())
    }
}

impl IntoResponse for BookingError {
    fn into_response(self) -> Response {
        let kind = self.kind();
        if kind == ErrorKind::Internal {
            tracing::error!(error = %self, code = self.code(), "request failed");
        }

        let body = serde_json::json!({ "code": self.code(), "error": self.to_string() });
        (kind.status_code(), axum::Json(body)).into_response()
    }
}

//! POST /confirm_booking and GET /bookings/{id}

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use uuid::Uuid;

use super::{ApiResponse, AppState, error, json_body};
use crate::booking::{BookingError, BookingRequest};
use crate::error::StoreError;

pub async fn confirm_booking(
    State(state): State<AppState>,
    body: Result<Json<BookingRequest>, JsonRejection>,
) -> ApiResponse {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    match state.bookings.confirm(&request).await {
        Ok(confirmation) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "message": "Booking confirmed and email sent",
                "bookingId": confirmation.booking_id,
                "recorded": confirmation.recorded,
            })),
        ),
        Err(e @ BookingError::MissingEmail) => {
            tracing::warn!("Booking confirmation without user email");
            error(StatusCode::BAD_REQUEST, e.to_string())
        }
        Err(e @ BookingError::Mail(_)) => error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
    }
}

pub async fn get_booking(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    // Booking ids are always v4 UUIDs; anything else cannot name a booking.
    if Uuid::parse_str(&id).is_err() {
        return error(StatusCode::NOT_FOUND, "Booking not found");
    }
    match state.store.get_booking(&id).await {
        Ok(record) => (StatusCode::OK, Json(serde_json::json!(record))),
        Err(StoreError::NotFound { .. }) => error(StatusCode::NOT_FOUND, "Booking not found"),
        Err(e) => {
            tracing::error!(booking_id = %id, error = %e, "Failed to load booking");
            error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

//! Read-only catalog listings.

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;

use super::{ApiResponse, AppState, error};

pub async fn colleges(State(state): State<AppState>) -> ApiResponse {
    (StatusCode::OK, Json(serde_json::json!(state.catalog.colleges())))
}

pub async fn counsellors(State(state): State<AppState>, Path(id): Path<String>) -> ApiResponse {
    if state.catalog.college(&id).is_none() {
        return error(StatusCode::NOT_FOUND, format!("Unknown college: {id}"));
    }
    (
        StatusCode::OK,
        Json(serde_json::json!(state.catalog.counsellors_for(&id))),
    )
}

pub async fn doctors(State(state): State<AppState>) -> ApiResponse {
    (StatusCode::OK, Json(serde_json::json!(state.catalog.doctors())))
}

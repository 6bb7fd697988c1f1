//! Resource metadata lookups and community comments.

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::Deserialize;

use super::{ApiResponse, AppState, error, json_body};
use crate::error::ScrapeError;
use crate::store::CommentRecord;

#[derive(Debug, Deserialize)]
pub struct MetadataRequest {
    #[serde(default)]
    pub url: String,
}

pub async fn article_metadata(
    State(state): State<AppState>,
    body: Result<Json<MetadataRequest>, JsonRejection>,
) -> ApiResponse {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    respond(state.metadata.article(&request.url).await)
}

pub async fn pdf_metadata(
    State(state): State<AppState>,
    body: Result<Json<MetadataRequest>, JsonRejection>,
) -> ApiResponse {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };
    respond(state.metadata.pdf(&request.url).await)
}

fn respond(result: Result<crate::scrape::ResourceMetadata, ScrapeError>) -> ApiResponse {
    match result {
        Ok(metadata) => (StatusCode::OK, Json(serde_json::json!(metadata))),
        Err(e @ ScrapeError::InvalidUrl { .. }) => error(StatusCode::BAD_REQUEST, e.to_string()),
        Err(ScrapeError::Forbidden(matches)) => (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "Resource contains content that is not allowed",
                "matches": matches,
            })),
        ),
        Err(e) => {
            tracing::warn!(error = %e, "Metadata extraction failed");
            error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    #[serde(default)]
    pub resource_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub user_display_name: String,
    #[serde(default, rename = "userPhotoURL")]
    pub user_photo_url: Option<String>,
    #[serde(default)]
    pub content: String,
}

pub async fn add_comment(
    State(state): State<AppState>,
    body: Result<Json<CommentRequest>, JsonRejection>,
) -> ApiResponse {
    let request = match json_body(body) {
        Ok(request) => request,
        Err(response) => return response,
    };

    let required = [
        ("resourceId", &request.resource_id),
        ("userId", &request.user_id),
        ("userDisplayName", &request.user_display_name),
        ("content", &request.content),
    ];
    if let Some((field, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
        return error(StatusCode::BAD_REQUEST, format!("{field} is required"));
    }

    let matches = state.safety.forbidden_matches(&request.content);
    if !matches.is_empty() {
        tracing::warn!(resource_id = %request.resource_id, ?matches, "Rejected comment");
        return (
            StatusCode::UNPROCESSABLE_ENTITY,
            Json(serde_json::json!({
                "error": "Comment contains content that is not allowed",
                "matches": matches,
            })),
        );
    }

    let mut comment = CommentRecord::new(
        request.resource_id.trim(),
        request.user_id.trim(),
        request.user_display_name.trim(),
        request.content.trim(),
    );
    comment.user_photo_url = request.user_photo_url.filter(|u| !u.trim().is_empty());

    match state.store.insert_comment(&comment).await {
        Ok(()) => (StatusCode::CREATED, Json(serde_json::json!({"id": comment.id}))),
        Err(e) => {
            tracing::error!(error = %e, "Failed to store comment");
            error(StatusCode::BAD_GATEWAY, e.to_string())
        }
    }
}

//! POST /chat

use axum::Json;
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApiResponse, AppState, error};
use crate::conversation::ConversationState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(default)]
    pub message: Option<String>,
    /// Omitted on a client's first turn; a new session is started.
    #[serde(default)]
    pub session_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    pub response: String,
    pub session_id: String,
    pub state: ConversationState,
}

pub async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<ChatResponse>, ApiResponse> {
    let no_message = || error(StatusCode::BAD_REQUEST, "No message provided");

    let Ok(Json(request)) = body else {
        return Err(no_message());
    };
    let message = request
        .message
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(no_message)?;
    let session_id = request
        .session_id
        .filter(|id| !id.trim().is_empty())
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    // Held for the whole turn so one session's turns never interleave
    let mut session = state.sessions.checkout(&session_id).await;
    let turn = state.dispatcher.dispatch(&session.state, &message).await;
    session.state = turn.next_state;
    session.touch();

    tracing::info!(
        session_id = %session_id,
        route = ?turn.route,
        state = %session.state,
        "Chat turn handled"
    );

    Ok(Json(ChatResponse {
        response: turn.reply,
        session_id,
        state: session.state.clone(),
    }))
}

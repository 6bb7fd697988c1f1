//! HTTP surface: chat, booking confirmation, resources, catalog, wellbeing.

pub mod booking;
pub mod catalog;
pub mod chat;
pub mod resources;
pub mod wellbeing;

use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::booking::BookingService;
use crate::catalog::Catalog;
use crate::conversation::{Dispatcher, SessionStore};
use crate::safety::SafetyLayer;
use crate::scrape::MetadataFetcher;
use crate::store::DocumentStore;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
    pub sessions: Arc<SessionStore>,
    pub safety: Arc<SafetyLayer>,
    pub catalog: Arc<Catalog>,
    pub bookings: Arc<BookingService>,
    pub store: Arc<dyn DocumentStore>,
    pub metadata: Arc<MetadataFetcher>,
}

/// Build the full router. CORS is open to every origin.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/chat", post(chat::chat))
        .route("/confirm_booking", post(booking::confirm_booking))
        .route("/bookings/{id}", get(booking::get_booking))
        .route("/metadata/article", post(resources::article_metadata))
        .route("/metadata/pdf", post(resources::pdf_metadata))
        .route("/comments", post(resources::add_comment))
        .route("/catalog/colleges", get(catalog::colleges))
        .route("/catalog/colleges/{id}/counsellors", get(catalog::counsellors))
        .route("/catalog/doctors", get(catalog::doctors))
        .route("/wellbeing/tip", get(wellbeing::tip))
        .route("/wellbeing/motivation", get(wellbeing::motivation))
        .route("/wellbeing/health/{topic}", get(wellbeing::health))
        .route("/wellbeing/help/{kind}", get(wellbeing::help))
        .route("/wellbeing/exercise/{kind}", get(wellbeing::exercise))
        .route("/wellbeing/coping/{issue}", get(wellbeing::coping))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ── Health ──────────────────────────────────────────────────────────────

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({
        "status": "ok",
        "service": "manobal"
    }))
}

// ── Helpers ─────────────────────────────────────────────────────────────

pub(crate) type ApiResponse = (StatusCode, Json<serde_json::Value>);

pub(crate) fn error(status: StatusCode, message: impl Into<String>) -> ApiResponse {
    (status, Json(serde_json::json!({"error": message.into()})))
}

/// Unwrap a JSON body, turning a malformed one into a 400 with our error shape.
pub(crate) fn json_body<T>(body: Result<Json<T>, JsonRejection>) -> Result<T, ApiResponse> {
    body.map(|Json(value)| value)
        .map_err(|rejection| error(StatusCode::BAD_REQUEST, rejection.body_text()))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::conversation::ModelFallback;
    use crate::error::LlmError;
    use crate::llm::{CompletionRequest, CompletionResponse, LlmProvider};
    use crate::store::MemoryStore;

    struct SilentLlm;

    #[async_trait]
    impl LlmProvider for SilentLlm {
        fn model_name(&self) -> &str {
            "silent"
        }

        async fn complete(&self, _request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
            Err(LlmError::RequestFailed {
                provider: "silent".into(),
                reason: "offline".into(),
            })
        }
    }

    fn app() -> Router {
        let safety = Arc::new(SafetyLayer::new());
        let catalog = Arc::new(Catalog::builtin());
        let store: Arc<dyn DocumentStore> = Arc::new(MemoryStore::new());
        router(AppState {
            dispatcher: Arc::new(Dispatcher::new(
                Arc::clone(&safety),
                Arc::clone(&catalog),
                ModelFallback::new(Arc::new(SilentLlm)),
            )),
            sessions: SessionStore::new(Duration::from_secs(60)),
            safety: Arc::clone(&safety),
            catalog,
            bookings: Arc::new(BookingService::new(None, Arc::clone(&store))),
            store,
            metadata: Arc::new(MetadataFetcher::new(Duration::from_secs(1), safety)),
        })
    }

    async fn call(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = app().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or_default())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_ok() {
        let (status, json) = call(Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn malformed_chat_body_is_missing_message() {
        let (status, json) = call(post_json("/chat", "{not json")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "No message provided");
    }

    #[tokio::test]
    async fn provider_failure_becomes_apology() {
        let (status, json) = call(post_json("/chat", r#"{"message": "hello"}"#)).await;
        assert_eq!(status, StatusCode::OK);
        let reply = json["response"].as_str().unwrap();
        assert!(reply.starts_with("⚠️ Sorry, something went wrong with the AI: "));
        assert!(reply.contains("offline"));
    }

    #[tokio::test]
    async fn booking_without_mailer_is_server_error() {
        let (status, json) = call(post_json(
            "/confirm_booking",
            r#"{"userEmail": "a@example.com"}"#,
        ))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            json["error"],
            "Failed to send confirmation email: mail delivery is not configured"
        );
    }

    #[tokio::test]
    async fn malformed_booking_body_is_400() {
        let (status, json) = call(post_json("/confirm_booking", "{\"userEmail\": ")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(json["error"].is_string());
    }
}

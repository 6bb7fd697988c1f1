//! Canned self-help content endpoints.

use axum::Json;
use axum::extract::Path;
use serde::Serialize;

use crate::wellbeing;

#[derive(Debug, Serialize)]
pub struct TextResponse {
    pub text: &'static str,
}

fn text(text: &'static str) -> Json<TextResponse> {
    Json(TextResponse { text })
}

pub async fn tip() -> Json<TextResponse> {
    text(wellbeing::self_care_tip())
}

pub async fn motivation() -> Json<TextResponse> {
    text(wellbeing::motivational_message())
}

pub async fn health(Path(topic): Path<String>) -> Json<TextResponse> {
    text(wellbeing::health_info(&topic))
}

pub async fn help(Path(kind): Path<String>) -> Json<TextResponse> {
    text(wellbeing::professional_help(&kind))
}

pub async fn exercise(Path(kind): Path<String>) -> Json<TextResponse> {
    text(wellbeing::relaxation_exercise(&kind))
}

pub async fn coping(Path(issue): Path<String>) -> Json<TextResponse> {
    text(wellbeing::coping_strategy(&issue))
}

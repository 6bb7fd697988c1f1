//! Bridges rig's `CompletionModel` to our `LlmProvider` trait.

use async_trait::async_trait;
use rig::OneOrMany;
use rig::completion::{AssistantContent, CompletionError, CompletionModel, Message};

use super::provider::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider, Role};
use crate::error::LlmError;

/// Wraps any rig completion model.
pub struct RigAdapter<M> {
    model: M,
    model_name: String,
    provider: String,
}

impl<M: CompletionModel> RigAdapter<M> {
    pub fn new(model: M, model_name: &str, provider: &str) -> Self {
        Self {
            model,
            model_name: model_name.to_string(),
            provider: provider.to_string(),
        }
    }
}

/// Split a request into rig's prompt and prior history.
///
/// System messages are left out; they travel as the preamble.
fn split_history(request: &CompletionRequest) -> Option<(String, Vec<Message>)> {
    let last_user = request.messages.iter().rposition(|m| m.role == Role::User)?;
    let prompt = request.messages[last_user].content.clone();
    let history = request.messages[..last_user]
        .iter()
        .filter_map(|m| match m.role {
            Role::User => Some(Message::user(m.content.clone())),
            Role::Assistant => Some(Message::assistant(m.content.clone())),
            Role::System => None,
        })
        .collect();
    Some((prompt, history))
}

/// Concatenated text parts of a rig choice.
fn choice_text(choice: &OneOrMany<AssistantContent>) -> String {
    choice
        .iter()
        .filter_map(|content| match content {
            AssistantContent::Text(text) => Some(text.text.as_str()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("")
}

fn map_error(provider: &str, err: CompletionError) -> LlmError {
    let provider = provider.to_string();
    match err {
        CompletionError::ProviderError(reason) => {
            let lower = reason.to_lowercase();
            if lower.contains("401") || lower.contains("unauthorized") {
                LlmError::AuthFailed { provider }
            } else if lower.contains("429") || lower.contains("rate limit") {
                LlmError::RateLimited {
                    provider,
                    retry_after: None,
                }
            } else {
                LlmError::ServerError { provider, reason }
            }
        }
        CompletionError::ResponseError(reason) => LlmError::InvalidResponse { provider, reason },
        CompletionError::JsonError(e) => LlmError::InvalidResponse {
            provider,
            reason: format!("Failed to parse response: {e}"),
        },
        other => LlmError::RequestFailed {
            provider,
            reason: other.to_string(),
        },
    }
}

#[async_trait]
impl<M> LlmProvider for RigAdapter<M>
where
    M: CompletionModel + 'static,
{
    fn model_name(&self) -> &str {
        &self.model_name
    }

    async fn complete(&self, request: CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let (prompt, history) =
            split_history(&request).ok_or_else(|| LlmError::RequestFailed {
                provider: self.provider.clone(),
                reason: "request has no user message".to_string(),
            })?;

        let mut builder = self.model.completion_request(prompt).messages(history);
        if let Some(preamble) = request.system_prompt() {
            builder = builder.preamble(preamble);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_error(&self.provider, e))?;

        let content = choice_text(&response.choice);
        if content.is_empty() {
            return Err(LlmError::InvalidResponse {
                provider: self.provider.clone(),
                reason: "response has no text".to_string(),
            });
        }

        Ok(CompletionResponse {
            content,
            finish_reason: FinishReason::Stop,
        })
    }
}

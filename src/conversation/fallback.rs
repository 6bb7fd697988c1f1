//! Model-call fallback: persona prompt + user text → provider reply.

use std::sync::Arc;

use tracing::{debug, warn};

use crate::llm::{ChatMessage, CompletionRequest, LlmProvider};

/// The mental-health companion persona sent with every model call.
pub const SYSTEM_PROMPT: &str = "\
You are Manobal, a compassionate mental health companion for students.
Your role combines:
- A **Medical Assistant**: provide safe, general health information on stress, sleep, anxiety, and lifestyle.
- A **Psychologist/Therapist**: listen empathetically, guide coping strategies, mindfulness, and motivational support.

Guidelines:
- Always be warm, supportive, and non-judgmental.
- Provide self-care suggestions, healthy routines, and emotional guidance.
- Encourage professional help when needed (counselor, doctor, helplines).
- If the student expresses harmful thoughts (suicidal or self-harm), immediately show a crisis response with helpline numbers.
- Never replace professional medical or psychological treatment.

Multilingual rule:
- Always detect the language of the student.
- Reply in the **same language** they used (example: if the student writes in Hindi, reply in Hindi).
- Keep messages short, clear, and caring.";

/// Prefix of the reply used when the provider call fails.
pub const PROVIDER_ERROR_PREFIX: &str = "⚠️ Sorry, something went wrong with the AI: ";

/// Wraps an `LlmProvider` so that every call yields displayable text.
pub struct ModelFallback {
    llm: Arc<dyn LlmProvider>,
}

impl ModelFallback {
    pub fn new(llm: Arc<dyn LlmProvider>) -> Self {
        Self { llm }
    }

    /// Ask the model. Never fails: provider errors become an apology string.
    pub async fn respond(&self, input: &str) -> String {
        let request = CompletionRequest::new(vec![
            ChatMessage::system(SYSTEM_PROMPT),
            ChatMessage::user(input),
        ]);

        match self.llm.complete(request).await {
            Ok(response) => {
                let text = response.content.trim();
                if text.is_empty() {
                    warn!(model = self.llm.model_name(), "Model returned empty text");
                    return format!("{PROVIDER_ERROR_PREFIX}empty response from model");
                }
                debug!(model = self.llm.model_name(), chars = text.len(), "Model replied");
                text.to_string()
            }
            Err(e) => {
                warn!(model = self.llm.model_name(), error = %e, "Model call failed");
                format!("{PROVIDER_ERROR_PREFIX}{e}")
            }
        }
    }
}

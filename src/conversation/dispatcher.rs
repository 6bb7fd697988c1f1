//! Message dispatcher: crisis check, booking flow, then the model.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use super::fallback::ModelFallback;
use super::state::ConversationState;
use crate::catalog::{Catalog, College};
use crate::safety::SafetyLayer;

pub const COUNSELLOR_CONFIRMATION: &str = "Thank you! Your counsellor request has been noted. \
Please open the booking page to choose a date and time for your session.";

pub const DOCTOR_CONFIRMATION: &str = "Thank you! Your doctor request has been noted. \
Please open the booking page to choose a date and time for your appointment.";

/// Which layer produced a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Route {
    Crisis,
    Booking,
    Model,
}

/// Output of one dispatched turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub reply: String,
    pub next_state: ConversationState,
    pub route: Route,
}

impl Turn {
    fn booking(reply: String, next_state: ConversationState) -> Self {
        Self {
            reply,
            next_state,
            route: Route::Booking,
        }
    }
}

/// Routes one user input given the session's current state.
pub struct Dispatcher {
    safety: Arc<SafetyLayer>,
    catalog: Arc<Catalog>,
    fallback: ModelFallback,
}

impl Dispatcher {
    pub fn new(safety: Arc<SafetyLayer>, catalog: Arc<Catalog>, fallback: ModelFallback) -> Self {
        Self {
            safety,
            catalog,
            fallback,
        }
    }

    /// Handle one turn. Always yields a reply; the state is returned, not mutated.
    pub async fn dispatch(&self, state: &ConversationState, input: &str) -> Turn {
        if self.safety.is_crisis(input) {
            info!(state = %state, "Crisis phrase detected, returning safety response");
            return Turn {
                reply: self.safety.crisis_message().to_string(),
                next_state: state.clone(),
                route: Route::Crisis,
            };
        }

        if let Some(turn) = self.booking_step(state, input) {
            debug!(from = %state, to = %turn.next_state, "Booking flow transition");
            return turn;
        }

        Turn {
            reply: self.fallback.respond(input).await,
            next_state: ConversationState::Idle,
            route: Route::Model,
        }
    }

    /// The booking state machine. `None` means fall through to the model.
    fn booking_step(&self, state: &ConversationState, input: &str) -> Option<Turn> {
        let lower = input.to_lowercase();
        match state {
            ConversationState::Idle => {
                if lower.contains("counsellor") {
                    Some(Turn::booking(
                        self.college_prompt(),
                        ConversationState::SelectingCollegeForCounsellor,
                    ))
                } else if lower.contains("doctor") {
                    Some(Turn::booking(
                        self.doctor_list(),
                        ConversationState::SelectingDoctor,
                    ))
                } else {
                    None
                }
            }
            ConversationState::SelectingCollegeForCounsellor => {
                match self.catalog.find_college_in(input) {
                    Some(college) => Some(Turn::booking(
                        self.counsellor_list(college),
                        ConversationState::SelectingCounsellor {
                            college_id: college.id.clone(),
                        },
                    )),
                    None => Some(Turn::booking(
                        self.college_retry(),
                        ConversationState::SelectingCollegeForCounsellor,
                    )),
                }
            }
            ConversationState::SelectingCounsellor { .. } => Some(Turn::booking(
                COUNSELLOR_CONFIRMATION.to_string(),
                ConversationState::Idle,
            )),
            ConversationState::SelectingDoctor => Some(Turn::booking(
                DOCTOR_CONFIRMATION.to_string(),
                ConversationState::Idle,
            )),
        }
    }

    fn college_names(&self) -> String {
        bullet_list(self.catalog.colleges().iter().map(|c| c.name.clone()))
    }

    fn college_prompt(&self) -> String {
        format!(
            "Sure, I can help you book a counsellor. Which college are you from?\n{}",
            self.college_names()
        )
    }

    fn college_retry(&self) -> String {
        format!(
            "Sorry, I couldn't find that college. Please type one of these college names:\n{}",
            self.college_names()
        )
    }

    fn counsellor_list(&self, college: &College) -> String {
        let counsellors = self.catalog.counsellors_for(&college.id);
        if counsellors.is_empty() {
            return format!(
                "There are no counsellors listed for {} yet. \
Reply with anything to finish, and you can still book through the booking page.",
                college.name
            );
        }
        let lines = counsellors
            .iter()
            .map(|c| with_specialty(&c.name, c.specialty.as_deref()));
        format!(
            "Here are the counsellors available at {}:\n{}\nPlease type the name of the counsellor you'd like to book.",
            college.name,
            bullet_list(lines)
        )
    }

    fn doctor_list(&self) -> String {
        let lines = self
            .catalog
            .doctors()
            .iter()
            .map(|d| with_specialty(&d.name, d.specialty.as_deref()));
        format!(
            "Here are the doctors available:\n{}\nPlease type the name of the doctor you'd like to book.",
            bullet_list(lines)
        )
    }
}

fn with_specialty(name: &str, specialty: Option<&str>) -> String {
    match specialty {
        Some(s) => format!("{name} ({s})"),
        None => name.to_string(),
    }
}

fn bullet_list(items: impl Iterator<Item = String>) -> String {
    items
        .map(|item| format!("- {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::error::LlmError;
    use crate::llm::{CompletionRequest, CompletionResponse, FinishReason, LlmProvider};

    /// Echoes the user text back and counts calls.
    struct EchoLlm {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl LlmProvider for EchoLlm {
        fn model_name(&self) -> &str {
            "echo"
        }

        async fn complete(
            &self,
            request: CompletionRequest,
        ) -> Result<CompletionResponse, LlmError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(CompletionResponse {
                content: format!("model: {}", request.last_user_message().unwrap_or_default()),
                finish_reason: FinishReason::Stop,
            })
        }
    }

    fn dispatcher() -> (Dispatcher, Arc<EchoLlm>) {
        let llm = Arc::new(EchoLlm {
            calls: AtomicUsize::new(0),
        });
        let dispatcher = Dispatcher::new(
            Arc::new(SafetyLayer::new()),
            Arc::new(Catalog::builtin()),
            ModelFallback::new(llm.clone()),
        );
        (dispatcher, llm)
    }

    fn selecting_counsellor(college_id: &str) -> ConversationState {
        ConversationState::SelectingCounsellor {
            college_id: college_id.to_string(),
        }
    }

    #[tokio::test]
    async fn crisis_bypasses_everything_and_keeps_state() {
        let (d, llm) = dispatcher();
        let states = [
            ConversationState::Idle,
            ConversationState::SelectingCollegeForCounsellor,
            selecting_counsellor("oxford_uni"),
            ConversationState::SelectingDoctor,
        ];
        for state in states {
            let turn = d.dispatch(&state, "I want to end it").await;
            assert_eq!(turn.route, Route::Crisis);
            assert_eq!(turn.reply, crate::safety::CRISIS_MESSAGE);
            assert_eq!(turn.next_state, state);
        }
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn every_crisis_phrase_triggers_in_any_case_and_state() {
        let (d, llm) = dispatcher();
        let states = [
            ConversationState::Idle,
            ConversationState::SelectingCollegeForCounsellor,
            selecting_counsellor("greenwood_college"),
            ConversationState::SelectingDoctor,
        ];
        for phrase in crate::safety::CRISIS_PHRASES {
            let input = format!("honestly {} right now", phrase.to_uppercase());
            for state in &states {
                let turn = d.dispatch(state, &input).await;
                assert_eq!(turn.route, Route::Crisis, "{input:?} in {state}");
                assert_eq!(turn.reply, crate::safety::CRISIS_MESSAGE);
                assert_eq!(&turn.next_state, state);
            }
        }
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn crisis_wins_over_booking_keywords() {
        let (d, _) = dispatcher();
        let turn = d
            .dispatch(&ConversationState::Idle, "counsellor please, I want to die")
            .await;
        assert_eq!(turn.route, Route::Crisis);
        assert_eq!(turn.next_state, ConversationState::Idle);
    }

    #[tokio::test]
    async fn counsellor_from_idle_lists_colleges() {
        let (d, llm) = dispatcher();
        let turn = d.dispatch(&ConversationState::Idle, "Counsellor").await;
        assert_eq!(turn.next_state, ConversationState::SelectingCollegeForCounsellor);
        assert_eq!(turn.route, Route::Booking);
        for college in Catalog::builtin().colleges() {
            assert!(turn.reply.contains(&college.name), "missing {}", college.name);
        }
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn doctor_from_idle_lists_doctors() {
        let (d, _) = dispatcher();
        let turn = d.dispatch(&ConversationState::Idle, "I need a DOCTOR").await;
        assert_eq!(turn.next_state, ConversationState::SelectingDoctor);
        for doctor in Catalog::builtin().doctors() {
            assert!(turn.reply.contains(&doctor.name));
        }
    }

    #[tokio::test]
    async fn counsellor_checked_before_doctor() {
        let (d, _) = dispatcher();
        let turn = d
            .dispatch(&ConversationState::Idle, "doctor or counsellor, either")
            .await;
        assert_eq!(turn.next_state, ConversationState::SelectingCollegeForCounsellor);
    }

    #[tokio::test]
    async fn college_selection_lists_only_that_college() {
        let (d, _) = dispatcher();
        let turn = d
            .dispatch(
                &ConversationState::SelectingCollegeForCounsellor,
                "Greenwood College",
            )
            .await;
        assert_eq!(turn.next_state, selecting_counsellor("greenwood_college"));
        assert_eq!(turn.next_state.selected_college_id(), Some("greenwood_college"));
        assert!(turn.reply.contains("Mr. Rohan Mehta"));
        assert!(turn.reply.contains("Ms. Laura Green"));
        assert!(!turn.reply.contains("Ms. Anya Sharma"));
        assert!(!turn.reply.contains("Mr. Ben Carter"));
    }

    #[tokio::test]
    async fn unknown_college_reprompts() {
        let (d, llm) = dispatcher();
        let turn = d
            .dispatch(&ConversationState::SelectingCollegeForCounsellor, "Hogwarts")
            .await;
        assert_eq!(turn.next_state, ConversationState::SelectingCollegeForCounsellor);
        assert!(turn.reply.starts_with("Sorry, I couldn't find that college."));
        assert!(turn.reply.contains("University of Oxford"));
        assert_eq!(llm.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn any_input_confirms_counsellor_and_clears_college() {
        let (d, _) = dispatcher();
        let turn = d
            .dispatch(&selecting_counsellor("cambridge_uni"), "whatever")
            .await;
        assert_eq!(turn.reply, COUNSELLOR_CONFIRMATION);
        assert_eq!(turn.next_state, ConversationState::Idle);
        assert!(turn.next_state.selected_college_id().is_none());
    }

    #[tokio::test]
    async fn any_input_confirms_doctor() {
        let (d, _) = dispatcher();
        let turn = d
            .dispatch(&ConversationState::SelectingDoctor, "Dr. Meera Iyer")
            .await;
        assert_eq!(turn.reply, DOCTOR_CONFIRMATION);
        assert_eq!(turn.next_state, ConversationState::Idle);
    }

    #[tokio::test]
    async fn plain_input_goes_to_model() {
        let (d, llm) = dispatcher();
        let turn = d.dispatch(&ConversationState::Idle, "hello").await;
        assert_eq!(turn.route, Route::Model);
        assert_eq!(turn.reply, "model: hello");
        assert_eq!(turn.next_state, ConversationState::Idle);
        assert_eq!(llm.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn college_without_counsellors_still_advances() {
        let catalog = Catalog::from_json(
            r#"{"colleges": [{"id": "empty", "name": "Quiet College"}]}"#,
        )
        .unwrap();
        let d = Dispatcher::new(
            Arc::new(SafetyLayer::new()),
            Arc::new(catalog),
            ModelFallback::new(Arc::new(EchoLlm {
                calls: AtomicUsize::new(0),
            })),
        );
        let turn = d
            .dispatch(&ConversationState::SelectingCollegeForCounsellor, "quiet college")
            .await;
        assert_eq!(turn.next_state, selecting_counsellor("empty"));
        assert!(turn.reply.contains("no counsellors listed for Quiet College"));
    }

    #[tokio::test]
    async fn full_counsellor_flow() {
        let (d, _) = dispatcher();
        let mut state = ConversationState::Idle;
        for input in ["I'd like a counsellor", "Manobal College", "Ms. Priya Singh"] {
            state = d.dispatch(&state, input).await.next_state;
        }
        assert_eq!(state, ConversationState::Idle);
    }
}

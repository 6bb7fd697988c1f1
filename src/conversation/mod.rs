//! Conversation handling: crisis interception, the booking flow state
//! machine, and the model fallback, plus per-session state storage.

pub mod dispatcher;
pub mod fallback;
pub mod sessions;
pub mod state;

pub use dispatcher::{Dispatcher, Route, Turn};
pub use fallback::{ModelFallback, SYSTEM_PROMPT};
pub use sessions::{Session, SessionGuard, SessionStore, spawn_prune_task};
pub use state::ConversationState;

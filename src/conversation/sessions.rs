//! Per-session conversation state, keyed by a caller-supplied session id.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{Mutex, OwnedMutexGuard, RwLock};
use tracing::{debug, info};

use super::state::ConversationState;

/// One session's booking-flow state.
#[derive(Debug)]
pub struct Session {
    pub state: ConversationState,
    last_seen: Instant,
}

impl Session {
    fn new() -> Self {
        Self {
            state: ConversationState::Idle,
            last_seen: Instant::now(),
        }
    }

    /// Mark the session as active now.
    pub fn touch(&mut self) {
        self.last_seen = Instant::now();
    }

    pub fn idle_for(&self) -> Duration {
        self.last_seen.elapsed()
    }
}

/// Exclusive access to a session for the duration of one turn.
pub type SessionGuard = OwnedMutexGuard<Session>;

/// Map of session id → state.
///
/// Every session has its own lock: turns within a session run one at a time,
/// different sessions never wait on each other.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<Mutex<Session>>>>,
    idle_timeout: Duration,
}

impl SessionStore {
    pub fn new(idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            idle_timeout,
        })
    }

    /// Lock a session for a turn, creating it as `Idle` if unknown.
    pub async fn checkout(&self, session_id: &str) -> SessionGuard {
        let existing = self.sessions.read().await.get(session_id).cloned();
        let entry = match existing {
            Some(entry) => entry,
            None => {
                let mut sessions = self.sessions.write().await;
                sessions
                    .entry(session_id.to_string())
                    .or_insert_with(|| {
                        debug!(session_id, "New conversation session");
                        Arc::new(Mutex::new(Session::new()))
                    })
                    .clone()
            }
        };
        entry.lock_owned().await
    }

    /// Current state of a session, if it exists.
    pub async fn state(&self, session_id: &str) -> Option<ConversationState> {
        let entry = self.sessions.read().await.get(session_id).cloned()?;
        let session = entry.lock().await;
        Some(session.state.clone())
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Drop sessions idle for at least the timeout. Sessions mid-turn are kept.
    pub async fn prune_idle(&self) -> usize {
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, entry| match entry.try_lock() {
            Ok(session) => session.idle_for() < self.idle_timeout,
            Err(_) => true,
        });
        let removed = before - sessions.len();
        if removed > 0 {
            info!(removed, remaining = sessions.len(), "Pruned idle sessions");
        }
        removed
    }
}

/// Spawn a background task that prunes idle sessions every `every`.
pub fn spawn_prune_task(store: Arc<SessionStore>, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        loop {
            interval.tick().await;
            store.prune_idle().await;
        }
    })
}

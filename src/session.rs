//! Per-session conversation state.
//!
//! The store maps caller-supplied session identifiers to a video transcript
//! and a bounded question/answer history. Sessions are created on the first
//! question, serialized per key by their own lock, and evicted after an idle
//! timeout. Nothing is persisted across restarts.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use tokio::sync::Mutex;
use tracing::debug;

/// Speaker role for one history entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// One entry in a session's conversation history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

impl ChatTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
        }
    }
}

/// Conversational context for one video within one session.
#[derive(Debug)]
pub struct Session {
    /// Video the transcript belongs to.
    pub video_id: String,
    /// Formatted transcript embedded in every prompt for this session.
    pub transcript: String,
    /// Alternating user/assistant turns, oldest first.
    pub history: Vec<ChatTurn>,
    pub created_at: DateTime<Utc>,
    pub last_active: DateTime<Utc>,
}

impl Session {
    /// Create a fresh session around a fetched transcript.
    pub fn new(video_id: String, transcript: String) -> Self {
        let now = Utc::now();
        Self {
            video_id,
            transcript,
            history: Vec::new(),
            created_at: now,
            last_active: now,
        }
    }

    /// Record one successful exchange and enforce the history bound.
    ///
    /// Whenever an append pushes the history over `max_entries`, the oldest
    /// exchange (two entries) is dropped.
    pub fn push_exchange(&mut self, question: &str, answer: &str, max_entries: usize) {
        self.history.push(ChatTurn::user(question));
        self.history.push(ChatTurn::assistant(answer));

        while self.history.len() > max_entries {
            self.history.drain(..2);
        }

        self.last_active = Utc::now();
    }
}

/// A session behind its own lock.
///
/// Holding the lock across the whole read-build-infer-append span serializes
/// concurrent requests that share a session identifier; requests for distinct
/// identifiers proceed in parallel.
pub struct SessionHandle {
    pub state: Mutex<Session>,
}

/// Process-wide session store.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Arc<SessionHandle>>>,
    max_history: usize,
    max_idle: Duration,
}

impl SessionStore {
    /// Create a store with the given history bound and idle timeout.
    pub fn new(max_history: usize, max_idle: Duration) -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            max_history,
            max_idle,
        }
    }

    /// Maximum history entries kept per session.
    pub fn max_history(&self) -> usize {
        self.max_history
    }

    /// Look up the handle for a session identifier.
    pub fn get(&self, id: &str) -> Option<Arc<SessionHandle>> {
        self.sessions.read().unwrap().get(id).cloned()
    }

    /// Insert a session for an identifier, or return the existing handle if
    /// a concurrent request created it first.
    pub fn insert(&self, id: &str, session: Session) -> Arc<SessionHandle> {
        let mut sessions = self.sessions.write().unwrap();
        sessions
            .entry(id.to_string())
            .or_insert_with(|| {
                Arc::new(SessionHandle {
                    state: Mutex::new(session),
                })
            })
            .clone()
    }

    /// Remove a session. Returns whether it existed.
    pub fn remove(&self, id: &str) -> bool {
        self.sessions.write().unwrap().remove(id).is_some()
    }

    /// Clear a session's history, keeping its transcript. Returns whether
    /// the session existed.
    pub async fn clear_history(&self, id: &str) -> bool {
        match self.get(id) {
            Some(handle) => {
                let mut session = handle.state.lock().await;
                session.history.clear();
                session.last_active = Utc::now();
                true
            }
            None => false,
        }
    }

    pub fn len(&self) -> usize {
        self.sessions.read().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.read().unwrap().is_empty()
    }

    /// Drop sessions idle longer than the configured timeout.
    ///
    /// Sessions currently locked by a request are skipped; they will be
    /// picked up on a later sweep. Returns the number evicted.
    pub fn evict_idle(&self) -> usize {
        let cutoff = Utc::now() - self.max_idle;
        let mut sessions = self.sessions.write().unwrap();
        let before = sessions.len();

        sessions.retain(|id, handle| match handle.state.try_lock() {
            Ok(session) => {
                let keep = session.last_active >= cutoff;
                if !keep {
                    debug!("Evicting idle session {}", id);
                }
                keep
            }
            Err(_) => true,
        });

        before - sessions.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> SessionStore {
        SessionStore::new(10, Duration::minutes(60))
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let store = store();
        assert!(store.get("s1").is_none());
        assert!(store.is_empty());

        store.insert("s1", Session::new("vid".into(), "transcript".into()));
        assert_eq!(store.len(), 1);

        let handle = store.get("s1").unwrap();
        let session = handle.state.lock().await;
        assert_eq!(session.video_id, "vid");
        assert!(session.history.is_empty());
    }

    #[tokio::test]
    async fn test_insert_keeps_existing_on_race() {
        let store = store();
        store.insert("s1", Session::new("first".into(), "t1".into()));
        let handle = store.insert("s1", Session::new("second".into(), "t2".into()));

        assert_eq!(handle.state.lock().await.video_id, "first");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_history_trimmed_to_bound() {
        let mut session = Session::new("vid".into(), "t".into());

        for i in 1..=6 {
            session.push_exchange(&format!("q{}", i), &format!("a{}", i), 10);
        }

        // Six exchanges appended, oldest one dropped
        assert_eq!(session.history.len(), 10);
        assert_eq!(session.history[0].content, "q2");
        assert_eq!(session.history[0].role, Role::User);
        assert_eq!(session.history[9].content, "a6");
        assert_eq!(session.history[9].role, Role::Assistant);
    }

    #[test]
    fn test_history_under_bound_untouched() {
        let mut session = Session::new("vid".into(), "t".into());
        session.push_exchange("q1", "a1", 10);
        session.push_exchange("q2", "a2", 10);
        assert_eq!(session.history.len(), 4);
        assert_eq!(session.history[0].content, "q1");
    }

    #[test]
    fn test_remove() {
        let store = store();
        store.insert("s1", Session::new("vid".into(), "t".into()));

        assert!(store.remove("s1"));
        assert!(store.get("s1").is_none());
        assert!(!store.remove("s1"));
    }

    #[tokio::test]
    async fn test_clear_history_keeps_transcript() {
        let store = store();
        let handle = store.insert("s1", Session::new("vid".into(), "t".into()));
        handle.state.lock().await.push_exchange("q", "a", 10);

        assert!(store.clear_history("s1").await);
        let session = handle.state.lock().await;
        assert!(session.history.is_empty());
        assert_eq!(session.transcript, "t");

        assert!(!store.clear_history("missing").await);
    }

    #[tokio::test]
    async fn test_evict_idle() {
        let store = SessionStore::new(10, Duration::zero());
        store.insert("stale", Session::new("vid".into(), "t".into()));

        // Zero idle timeout: everything unlocked is stale
        assert_eq!(store.evict_idle(), 1);
        assert!(store.is_empty());
    }

    #[tokio::test]
    async fn test_evict_skips_locked_sessions() {
        let store = SessionStore::new(10, Duration::zero());
        let handle = store.insert("busy", Session::new("vid".into(), "t".into()));

        let guard = handle.state.lock().await;
        assert_eq!(store.evict_idle(), 0);
        assert_eq!(store.len(), 1);
        drop(guard);

        assert_eq!(store.evict_idle(), 1);
    }
}

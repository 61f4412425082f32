//! Live sessions, keyed by username.

use std::collections::HashMap;

use tokio::sync::{RwLock, mpsc};

// ── Session handle ───────────────────────────────────────────────────────────

/// A live, authenticated connection.
///
/// Delivery goes through `sender`; the writer task on the other end owns
/// the socket write half and appends the newline. Cloning is cheap and
/// does not extend the session's lifetime: once the writer hangs up,
/// every clone's [`Session::send`] returns false.
#[derive(Debug, Clone)]
pub struct Session {
    pub username: String,
    sender: mpsc::UnboundedSender<String>,
}

impl Session {
    pub fn new(username: impl Into<String>, sender: mpsc::UnboundedSender<String>) -> Self {
        Self {
            username: username.into(),
            sender,
        }
    }

    /// Queue one line for this session. Returns false once the writer
    /// task has hung up (the connection is closing).
    pub fn send(&self, line: &str) -> bool {
        self.sender.send(line.to_string()).is_ok()
    }
}

// ── Registry ─────────────────────────────────────────────────────────────────

/// All live sessions. A username appears at most once; an entry exists
/// iff its connection is open and past authentication.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    inner: RwLock<HashMap<String, Session>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly authenticated session. The auth gate guarantees
    /// the username is not already present.
    pub async fn register(&self, session: Session) {
        let mut inner = self.inner.write().await;
        debug_assert!(!inner.contains_key(&session.username));
        inner.insert(session.username.clone(), session);
    }

    /// Remove a session by username. A no-op when absent, so duplicate
    /// cleanup invocations are harmless.
    pub async fn unregister(&self, username: &str) -> Option<Session> {
        self.inner.write().await.remove(username)
    }

    /// Look up one session, for private delivery.
    pub async fn lookup(&self, username: &str) -> Option<Session> {
        self.inner.read().await.get(username).cloned()
    }

    /// Copy of the live session list. Taken under the lock; callers
    /// iterate and deliver outside it.
    pub async fn snapshot(&self) -> Vec<Session> {
        self.inner.read().await.values().cloned().collect()
    }

    pub async fn count(&self) -> usize {
        self.inner.read().await.len()
    }
}

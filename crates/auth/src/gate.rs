//! The login gate: credential check plus the duplicate-login guard.

use std::collections::HashSet;

use thiserror::Error;
use tokio::sync::Mutex;

use crate::CredentialStore;

/// Why a login attempt was turned away. Both kinds are terminal: the
/// caller closes the connection without registering a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum AuthError {
    /// Unknown username or wrong password.
    #[error("authentication failed")]
    BadCredentials,
    /// The username already backs a live session somewhere else.
    #[error("user already logged in")]
    AlreadyActive,
}

/// Admits logins and tracks which usernames currently hold a session.
///
/// The active set mirrors the session registry: a username is in it iff a
/// session for it exists. The gate owns the set so that the duplicate
/// check and the claim are one atomic step.
pub struct AuthGate {
    credentials: CredentialStore,
    active: Mutex<HashSet<String>>,
}

impl AuthGate {
    pub fn new(credentials: CredentialStore) -> Self {
        Self {
            credentials,
            active: Mutex::new(HashSet::new()),
        }
    }

    /// Check credentials and claim the username in one step.
    ///
    /// The duplicate check and the insert share one lock scope, so two
    /// racing logins for the same username cannot both pass. On success
    /// the username stays claimed until [`AuthGate::release`].
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<(), AuthError> {
        if !self.credentials.verify(username, password) {
            return Err(AuthError::BadCredentials);
        }
        let mut active = self.active.lock().await;
        if !active.insert(username.to_string()) {
            return Err(AuthError::AlreadyActive);
        }
        Ok(())
    }

    /// Release a username claimed by [`AuthGate::authenticate`].
    /// Idempotent; called during session cleanup.
    pub async fn release(&self, username: &str) {
        self.active.lock().await.remove(username);
    }

    /// Whether the username currently holds a session.
    pub async fn is_active(&self, username: &str) -> bool {
        self.active.lock().await.contains(username)
    }
}

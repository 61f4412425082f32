use std::sync::Arc;

use palaver_auth::{AuthGate, CredentialStore};
use palaver_registry::{GroupRegistry, SessionRegistry};

/// Shared relay runtime state, wrapped in Arc for use across tasks.
///
/// Each field owns its own lock; nothing here is locked as a whole.
pub struct RelayState {
    /// Credential check plus the duplicate-login guard.
    pub auth: AuthGate,
    /// All live sessions, keyed by username.
    pub sessions: SessionRegistry,
    /// Named groups and their member sets.
    pub groups: GroupRegistry,
}

impl RelayState {
    pub fn new(credentials: CredentialStore) -> Arc<Self> {
        Arc::new(Self {
            auth: AuthGate::new(credentials),
            sessions: SessionRegistry::new(),
            groups: GroupRegistry::new(),
        })
    }
}

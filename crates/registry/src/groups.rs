//! Named groups and their member sets.

use std::collections::{HashMap, HashSet};

use thiserror::Error;
use tokio::sync::RwLock;

/// Group operation failures. All recoverable: the protocol layer maps
/// each to an inline reply and the session stays active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GroupError {
    #[error("group already exists")]
    AlreadyExists,
    /// Absent group — and, for `leave`, a caller who is not a member;
    /// the client reply does not distinguish the two.
    #[error("group not found")]
    NotFound,
    #[error("already a member of this group")]
    AlreadyMember,
}

/// Named groups. Keys and member names are case-sensitive exact strings.
///
/// Membership is only ever removed explicitly (`leave`) or by session
/// cleanup; a group that drains to empty keeps its name claimed.
#[derive(Debug, Default)]
pub struct GroupRegistry {
    inner: RwLock<HashMap<String, HashSet<String>>>,
}

impl GroupRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a group with `creator` as its sole member.
    pub async fn create(&self, name: &str, creator: &str) -> Result<(), GroupError> {
        let mut inner = self.inner.write().await;
        if inner.contains_key(name) {
            return Err(GroupError::AlreadyExists);
        }
        inner.insert(name.to_string(), HashSet::from([creator.to_string()]));
        Ok(())
    }

    pub async fn join(&self, name: &str, username: &str) -> Result<(), GroupError> {
        let mut inner = self.inner.write().await;
        let members = inner.get_mut(name).ok_or(GroupError::NotFound)?;
        if !members.insert(username.to_string()) {
            return Err(GroupError::AlreadyMember);
        }
        Ok(())
    }

    pub async fn leave(&self, name: &str, username: &str) -> Result<(), GroupError> {
        let mut inner = self.inner.write().await;
        let members = inner.get_mut(name).ok_or(GroupError::NotFound)?;
        if !members.remove(username) {
            return Err(GroupError::NotFound);
        }
        Ok(())
    }

    /// Copy of a group's member set, for delivery outside the lock.
    pub async fn members(&self, name: &str) -> Option<HashSet<String>> {
        self.inner.read().await.get(name).cloned()
    }

    /// Membership pre-check for `/group_msg`.
    pub async fn is_member(&self, name: &str, username: &str) -> Result<bool, GroupError> {
        self.inner
            .read()
            .await
            .get(name)
            .map(|members| members.contains(username))
            .ok_or(GroupError::NotFound)
    }

    /// Strip `username` from every group. Part of session cleanup; never
    /// fails.
    pub async fn remove_from_all(&self, username: &str) {
        let mut inner = self.inner.write().await;
        for members in inner.values_mut() {
            members.remove(username);
        }
    }
}

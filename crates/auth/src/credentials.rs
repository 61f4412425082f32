//! The credential file: `username:password`, one pair per line.

use std::{collections::HashMap, path::Path};

use tracing::warn;

/// Immutable username → password table, loaded once at process start.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    users: HashMap<String, String>,
}

impl CredentialStore {
    /// Load a credential file from disk.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read {}: {e}", path.display()))?;
        Ok(Self::parse(&raw))
    }

    /// Parse `username:password` lines. Lines without a separator are
    /// skipped with a warning rather than failing the whole file; a
    /// repeated username keeps the last entry.
    pub fn parse(raw: &str) -> Self {
        let mut users = HashMap::new();
        for (idx, line) in raw.lines().enumerate() {
            let line = line.trim_end_matches('\r');
            if line.is_empty() {
                continue;
            }
            match line.split_once(':') {
                Some((username, password)) => {
                    users.insert(username.to_string(), password.to_string());
                },
                None => warn!(line = idx + 1, "skipping malformed credential line"),
            }
        }
        Self { users }
    }

    /// Exact-match password check. No normalization, no hashing; the
    /// comparison itself is constant time over the stored value.
    pub fn verify(&self, username: &str, password: &str) -> bool {
        self.users
            .get(username)
            .is_some_and(|expected| safe_equal(expected, password))
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

/// Constant-time string comparison (prevents timing attacks).
fn safe_equal(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    // XOR each byte and accumulate; any difference makes result non-zero.
    let diff = a
        .as_bytes()
        .iter()
        .zip(b.as_bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y));
    diff == 0
}

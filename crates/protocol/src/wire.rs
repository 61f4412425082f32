//! Fixed server-to-client strings and message formatting.
//!
//! These are wire protocol, not UI copy: existing clients match on them
//! byte for byte, so any change here is a breaking change.

// ── Login handshake ──────────────────────────────────────────────────────────

pub const PROMPT_USERNAME: &str = "Enter Username";
pub const PROMPT_PASSWORD: &str = "Enter Password";
pub const AUTH_OK: &str = "Authentication Successful";
pub const AUTH_FAILED: &str = "Authentication failed";
pub const ALREADY_LOGGED_IN: &str = "User already logged in";

// ── Group command replies ────────────────────────────────────────────────────

pub const GROUP_CREATED: &str = "Group created successfully.";
pub const GROUP_ALREADY_EXISTS: &str = "Group already exists.";
pub const GROUP_JOINED: &str = "Joined group successfully.";
pub const ALREADY_A_MEMBER: &str = "You are already a member of this group.";
pub const GROUP_LEFT: &str = "Left group successfully.";
pub const LEAVE_FAILED: &str = "Group does not exists or you are not part of this group.";

/// Reply to `/group_msg` naming an unknown group. The join reply
/// [`JOIN_NO_SUCH_GROUP`] differs by one trailing period; both spellings
/// are load-bearing.
pub const GROUP_MSG_NO_SUCH_GROUP: &str = "Group does not exist";
pub const JOIN_NO_SUCH_GROUP: &str = "Group does not exist.";
pub const NOT_A_MEMBER: &str = "Error: You are not a member of the group.";

// ── Formatted delivery lines ─────────────────────────────────────────────────

pub fn broadcast_from(sender: &str, text: &str) -> String {
    format!("Broadcast from {sender}: {text}")
}

pub fn private_from(sender: &str, text: &str) -> String {
    format!("Private message from {sender}: {text}")
}

pub fn group_from(sender: &str, group: &str, text: &str) -> String {
    format!("Group message from {sender} in {group}: {text}")
}

/// Bounced back to the sender of a `/msg` to a user with no live session.
pub fn user_not_found(recipient: &str) -> String {
    format!("Error: User '{recipient}' not found or not connected.")
}

pub fn joined_chat(username: &str) -> String {
    format!("{username} has joined the chat.")
}

pub fn exited_chat(username: &str) -> String {
    format!("{username} has exited the chat.")
}

//! Recipient resolution and best-effort delivery.
//!
//! Every path here follows the same discipline: resolve the recipient set
//! under the relevant registry lock, release it, then deliver. Delivery
//! is a queue push into each session's writer, so one slow peer never
//! stalls another. A recipient whose writer already hung up is skipped
//! with a debug log; that is never surfaced as a command failure.

use tracing::debug;

use palaver_protocol::wire;

use crate::state::RelayState;

/// Send `line` to every live session except `exclude`.
///
/// The session list is a snapshot; a session racing into cleanup may
/// still appear in it, and the failed send is silently dropped.
pub async fn send_to_all_except(state: &RelayState, exclude: &str, line: &str) {
    for session in state.sessions.snapshot().await {
        if session.username == exclude {
            continue;
        }
        if !session.send(line) {
            debug!(recipient = %session.username, "dropping line for closing session");
        }
    }
}

/// `/broadcast` — relay `text` from `sender` to everyone else.
pub async fn broadcast(state: &RelayState, sender: &str, text: &str) {
    send_to_all_except(state, sender, &wire::broadcast_from(sender, text)).await;
}

/// `/msg` — deliver to one recipient, or bounce a not-found notice back
/// to the sender. Nothing is queued for offline users.
pub async fn private(state: &RelayState, sender: &str, recipient: &str, text: &str) {
    match state.sessions.lookup(recipient).await {
        Some(session) => {
            if !session.send(&wire::private_from(sender, text)) {
                debug!(%recipient, "dropping private message for closing session");
            }
        },
        None => {
            if let Some(back) = state.sessions.lookup(sender).await {
                back.send(&wire::user_not_found(recipient));
            }
        },
    }
}

/// `/group_msg` — deliver to every member with a live session except the
/// sender. Members without a session are silently skipped.
///
/// The protocol layer has already checked existence and membership and
/// released the group lock; a group that vanished in between delivers to
/// nobody.
pub async fn group(state: &RelayState, sender: &str, group: &str, text: &str) {
    let Some(members) = state.groups.members(group).await else {
        return;
    };
    let line = wire::group_from(sender, group, text);
    for member in members {
        if member == sender {
            continue;
        }
        if let Some(session) = state.sessions.lookup(&member).await
            && !session.send(&line)
        {
            debug!(recipient = %member, "dropping group message for closing session");
        }
    }
}

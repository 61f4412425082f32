//! The per-connection protocol session.
//!
//! One connection is driven by two tasks: this one, which owns the read
//! half and the protocol state machine (connected → authenticating →
//! active → closed, expressed directly in control flow), and a writer
//! task that drains the session's outbound queue onto the write half.
//! All writes, including the login prompts, go through the queue so the
//! socket is only ever touched from one task.

use std::sync::Arc;

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    sync::mpsc,
};
use tracing::{debug, info, warn};

use palaver_auth::AuthError;
use palaver_protocol::{Command, wire};
use palaver_registry::{GroupError, Session};

use crate::{router, state::RelayState};

type LineReader = Lines<BufReader<OwnedReadHalf>>;
type Outbound = mpsc::UnboundedSender<String>;

// ── Connection lifecycle ─────────────────────────────────────────────────────

/// Drive one client connection from accept to disconnect.
pub async fn handle_connection(stream: TcpStream, state: Arc<RelayState>) {
    let peer = stream
        .peer_addr()
        .map(|addr| addr.to_string())
        .unwrap_or_else(|_| "unknown".into());
    info!(%peer, "client connected");

    let (read_half, write_half) = stream.into_split();
    let mut reader = BufReader::new(read_half).lines();
    let (tx, rx) = mpsc::unbounded_channel();
    let writer = tokio::spawn(write_lines(rx, write_half));

    if let Some(username) = authenticate(&state, &mut reader, &tx).await {
        // Register before confirming, so a client that saw the success
        // line is already a valid delivery target.
        let session = Session::new(username.clone(), tx.clone());
        state.sessions.register(session).await;
        send_line(&tx, wire::AUTH_OK);
        router::send_to_all_except(&state, &username, &wire::joined_chat(&username)).await;

        run_active(&state, &username, &mut reader, &tx).await;

        info!(%peer, %username, "client disconnected");
        cleanup(&state, &username).await;
        router::send_to_all_except(&state, &username, &wire::exited_chat(&username)).await;
    }

    // Closing the queue lets the writer flush pending lines, then both
    // halves drop and the peer sees EOF.
    drop(tx);
    let _ = writer.await;
}

/// Tear down every trace of a session, in an order that keeps the shared
/// state consistent at each step: drop the session first so a racing
/// broadcast can no longer pick this user as a target, then free the
/// login so the username can reconnect, then purge group memberships.
async fn cleanup(state: &RelayState, username: &str) {
    state.sessions.unregister(username).await;
    state.auth.release(username).await;
    state.groups.remove_from_all(username).await;
}

/// Writer task: drains the outbound queue onto the socket, one line per
/// message. Returns on queue close or the first write failure.
async fn write_lines(mut rx: mpsc::UnboundedReceiver<String>, mut half: OwnedWriteHalf) {
    while let Some(mut line) = rx.recv().await {
        line.push('\n');
        if let Err(error) = half.write_all(line.as_bytes()).await {
            debug!(%error, "outbound write failed, closing writer");
            break;
        }
    }
}

// ── Authenticating ───────────────────────────────────────────────────────────

/// Login handshake: two prompts, two lines, one gate decision.
///
/// Returns the authenticated username, or None when the connection must
/// close (bad credentials, duplicate login, or the peer went away).
/// Failure replies are sent here; the success reply is the caller's,
/// after registration.
async fn authenticate(state: &RelayState, reader: &mut LineReader, tx: &Outbound) -> Option<String> {
    send_line(tx, wire::PROMPT_USERNAME);
    let username = read_line(reader).await?;
    send_line(tx, wire::PROMPT_PASSWORD);
    let password = read_line(reader).await?;

    match state.auth.authenticate(&username, &password).await {
        Ok(()) => {
            info!(%username, "client authenticated");
            Some(username)
        },
        Err(AuthError::BadCredentials) => {
            warn!(%username, "authentication failed");
            send_line(tx, wire::AUTH_FAILED);
            None
        },
        Err(AuthError::AlreadyActive) => {
            warn!(%username, "duplicate login rejected");
            send_line(tx, wire::ALREADY_LOGGED_IN);
            None
        },
    }
}

// ── Active ───────────────────────────────────────────────────────────────────

/// The active loop: read, parse, dispatch, until the peer goes away.
async fn run_active(state: &RelayState, username: &str, reader: &mut LineReader, tx: &Outbound) {
    loop {
        let line = match reader.next_line().await {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(error) => {
                debug!(%username, %error, "read failed");
                break;
            },
        };
        debug!(%username, message = %line, "received");
        match Command::parse(&line) {
            Ok(command) => dispatch(state, username, command, tx).await,
            Err(error) => send_line(tx, &error.to_string()),
        }
    }
}

async fn dispatch(state: &RelayState, username: &str, command: Command, tx: &Outbound) {
    match command {
        Command::Broadcast { text } => router::broadcast(state, username, &text).await,
        Command::Private { to, text } => router::private(state, username, &to, &text).await,
        Command::GroupMessage { group, text } => {
            // Existence and membership are settled, and the group lock
            // released, before any delivery starts.
            match state.groups.is_member(&group, username).await {
                Ok(true) => router::group(state, username, &group, &text).await,
                Ok(false) => send_line(tx, wire::NOT_A_MEMBER),
                Err(_) => send_line(tx, wire::GROUP_MSG_NO_SUCH_GROUP),
            }
        },
        Command::CreateGroup { name } => {
            let reply = match state.groups.create(&name, username).await {
                Ok(()) => wire::GROUP_CREATED,
                Err(_) => wire::GROUP_ALREADY_EXISTS,
            };
            send_line(tx, reply);
        },
        Command::JoinGroup { name } => {
            let reply = match state.groups.join(&name, username).await {
                Ok(()) => wire::GROUP_JOINED,
                Err(GroupError::AlreadyMember) => wire::ALREADY_A_MEMBER,
                Err(_) => wire::JOIN_NO_SUCH_GROUP,
            };
            send_line(tx, reply);
        },
        Command::LeaveGroup { name } => {
            let reply = match state.groups.leave(&name, username).await {
                Ok(()) => wire::GROUP_LEFT,
                Err(_) => wire::LEAVE_FAILED,
            };
            send_line(tx, reply);
        },
    }
}

// ── Helpers ──────────────────────────────────────────────────────────────────

fn send_line(tx: &Outbound, line: &str) {
    // The writer hanging up means the connection is closing; the read
    // side will notice on its own.
    let _ = tx.send(line.to_string());
}

/// One line from the peer, trailing `\r\n` stripped. None on EOF or a
/// transport error; both end the session the same way.
async fn read_line(reader: &mut LineReader) -> Option<String> {
    reader.next_line().await.ok().flatten()
}

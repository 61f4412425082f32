//! End-to-end tests driving real TCP connections against a relay bound
//! to an ephemeral port.

use std::{net::SocketAddr, sync::Arc, time::Duration};

use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines},
    net::{
        TcpStream,
        tcp::{OwnedReadHalf, OwnedWriteHalf},
    },
    time::timeout,
};

use palaver_auth::CredentialStore;
use palaver_relay::{RelayState, server};

const USERS: &str = "alice:wonder\nbob:builder\ncarol:xmas\n";

async fn spawn_relay() -> SocketAddr {
    let state: Arc<RelayState> = RelayState::new(CredentialStore::parse(USERS));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(server::serve(listener, state));
    addr
}

struct Client {
    reader: Lines<BufReader<OwnedReadHalf>>,
    writer: OwnedWriteHalf,
}

impl Client {
    async fn connect(addr: SocketAddr) -> Self {
        let stream = TcpStream::connect(addr).await.unwrap();
        let (read_half, writer) = stream.into_split();
        Self {
            reader: BufReader::new(read_half).lines(),
            writer,
        }
    }

    /// Next line from the server, with a timeout so a missing delivery
    /// fails the test instead of hanging it.
    async fn recv(&mut self) -> String {
        timeout(Duration::from_secs(5), self.reader.next_line())
            .await
            .expect("timed out waiting for a server line")
            .unwrap()
            .expect("connection closed unexpectedly")
    }

    /// None once the server has closed the connection.
    async fn recv_eof(&mut self) -> Option<String> {
        timeout(Duration::from_secs(5), self.reader.next_line())
            .await
            .expect("timed out waiting for EOF")
            .unwrap()
    }

    async fn send(&mut self, line: &str) {
        self.writer
            .write_all(format!("{line}\n").as_bytes())
            .await
            .unwrap();
    }

    /// Run the login handshake up to the server's verdict line.
    async fn login(addr: SocketAddr, username: &str, password: &str) -> Self {
        let mut client = Self::connect(addr).await;
        assert_eq!(client.recv().await, "Enter Username");
        client.send(username).await;
        assert_eq!(client.recv().await, "Enter Password");
        client.send(password).await;
        client
    }

    async fn login_ok(addr: SocketAddr, username: &str, password: &str) -> Self {
        let mut client = Self::login(addr, username, password).await;
        assert_eq!(client.recv().await, "Authentication Successful");
        client
    }
}

// ── Login handshake ──────────────────────────────────────────────────────────

#[tokio::test]
async fn successful_login_and_join_notice() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;

    let _bob = Client::login_ok(addr, "bob", "builder").await;
    assert_eq!(alice.recv().await, "bob has joined the chat.");
}

#[tokio::test]
async fn bad_credentials_close_the_connection() {
    let addr = spawn_relay().await;

    let mut client = Client::login(addr, "alice", "blunder").await;
    assert_eq!(client.recv_eof().await.as_deref(), Some("Authentication failed"));
    assert_eq!(client.recv_eof().await, None);

    let mut client = Client::login(addr, "mallory", "whatever").await;
    assert_eq!(client.recv_eof().await.as_deref(), Some("Authentication failed"));
    assert_eq!(client.recv_eof().await, None);
}

#[tokio::test]
async fn duplicate_login_is_rejected_and_first_session_survives() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;

    let mut imposter = Client::login(addr, "alice", "wonder").await;
    assert_eq!(
        imposter.recv_eof().await.as_deref(),
        Some("User already logged in")
    );
    assert_eq!(imposter.recv_eof().await, None);

    // The original session keeps working.
    alice.send("/create_group team").await;
    assert_eq!(alice.recv().await, "Group created successfully.");
}

// ── Messaging ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn private_message_and_not_found_notice() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;
    let mut bob = Client::login_ok(addr, "bob", "builder").await;
    // Once alice sees the join notice, bob is registered.
    assert_eq!(alice.recv().await, "bob has joined the chat.");

    alice.send("/msg bob hello").await;
    assert_eq!(bob.recv().await, "Private message from alice: hello");

    alice.send("/msg carol hi").await;
    assert_eq!(
        alice.recv().await,
        "Error: User 'carol' not found or not connected."
    );
}

#[tokio::test]
async fn broadcast_reaches_everyone_but_the_sender() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;
    let mut bob = Client::login_ok(addr, "bob", "builder").await;
    let mut carol = Client::login_ok(addr, "carol", "xmas").await;
    assert_eq!(alice.recv().await, "bob has joined the chat.");
    assert_eq!(alice.recv().await, "carol has joined the chat.");
    assert_eq!(bob.recv().await, "carol has joined the chat.");

    alice.send("/broadcast yo").await;
    assert_eq!(bob.recv().await, "Broadcast from alice: yo");
    assert_eq!(carol.recv().await, "Broadcast from alice: yo");

    // alice must not see her own broadcast: the next line she receives
    // is bob's later private message, not the broadcast.
    bob.send("/msg alice marker").await;
    assert_eq!(alice.recv().await, "Private message from bob: marker");
}

#[tokio::test]
async fn empty_broadcast_is_forwarded() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;
    let mut bob = Client::login_ok(addr, "bob", "builder").await;
    assert_eq!(alice.recv().await, "bob has joined the chat.");

    alice.send("/broadcast ").await;
    assert_eq!(bob.recv().await, "Broadcast from alice: ");
}

#[tokio::test]
async fn malformed_commands_get_inline_replies_and_session_survives() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;

    alice.send("hello all").await;
    assert_eq!(alice.recv().await, "Incorrect Format of message");

    alice.send("/msg bob").await;
    assert_eq!(
        alice.recv().await,
        "Invalid command format. Use: /msg <username> <message>"
    );

    alice.send("/group_msg team ").await;
    assert_eq!(
        alice.recv().await,
        "Error: Group name or message cannot be empty."
    );

    alice.send("/create_group ").await;
    assert_eq!(alice.recv().await, "Error: Group name cannot be empty.");

    // Still active after every rejection.
    alice.send("/create_group team").await;
    assert_eq!(alice.recv().await, "Group created successfully.");
}

// ── Groups ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn group_lifecycle_and_scoped_delivery() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;
    let mut bob = Client::login_ok(addr, "bob", "builder").await;
    let mut carol = Client::login_ok(addr, "carol", "xmas").await;
    assert_eq!(alice.recv().await, "bob has joined the chat.");
    assert_eq!(alice.recv().await, "carol has joined the chat.");
    assert_eq!(bob.recv().await, "carol has joined the chat.");

    alice.send("/create_group team").await;
    assert_eq!(alice.recv().await, "Group created successfully.");
    alice.send("/create_group team").await;
    assert_eq!(alice.recv().await, "Group already exists.");

    bob.send("/join_group team").await;
    assert_eq!(bob.recv().await, "Joined group successfully.");
    bob.send("/join_group team").await;
    assert_eq!(bob.recv().await, "You are already a member of this group.");
    bob.send("/join_group ghost").await;
    assert_eq!(bob.recv().await, "Group does not exist.");

    alice.send("/group_msg team hi all").await;
    assert_eq!(bob.recv().await, "Group message from alice in team: hi all");

    // carol is connected but not a member: her next line is the later
    // private message, proving the group message never reached her.
    alice.send("/msg carol ping").await;
    assert_eq!(carol.recv().await, "Private message from alice: ping");
}

#[tokio::test]
async fn group_message_guards_existence_and_membership() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;
    let mut bob = Client::login_ok(addr, "bob", "builder").await;
    assert_eq!(alice.recv().await, "bob has joined the chat.");

    bob.send("/group_msg ghost hi").await;
    assert_eq!(bob.recv().await, "Group does not exist");

    alice.send("/create_group team").await;
    assert_eq!(alice.recv().await, "Group created successfully.");
    bob.send("/group_msg team hi").await;
    assert_eq!(bob.recv().await, "Error: You are not a member of the group.");
}

#[tokio::test]
async fn leave_group_semantics() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;
    let mut bob = Client::login_ok(addr, "bob", "builder").await;
    assert_eq!(alice.recv().await, "bob has joined the chat.");

    alice.send("/create_group team").await;
    assert_eq!(alice.recv().await, "Group created successfully.");

    bob.send("/leave_group team").await;
    assert_eq!(
        bob.recv().await,
        "Group does not exists or you are not part of this group."
    );
    bob.send("/leave_group ghost").await;
    assert_eq!(
        bob.recv().await,
        "Group does not exists or you are not part of this group."
    );

    bob.send("/join_group team").await;
    assert_eq!(bob.recv().await, "Joined group successfully.");
    bob.send("/leave_group team").await;
    assert_eq!(bob.recv().await, "Left group successfully.");

    // No longer a member: group messages are refused again.
    bob.send("/group_msg team hi").await;
    assert_eq!(bob.recv().await, "Error: You are not a member of the group.");
}

// ── Disconnect cleanup ───────────────────────────────────────────────────────

#[tokio::test]
async fn disconnect_cleans_up_every_registry() {
    let addr = spawn_relay().await;
    let mut alice = Client::login_ok(addr, "alice", "wonder").await;
    let mut bob = Client::login_ok(addr, "bob", "builder").await;
    assert_eq!(alice.recv().await, "bob has joined the chat.");

    alice.send("/create_group team").await;
    assert_eq!(alice.recv().await, "Group created successfully.");
    bob.send("/join_group team").await;
    assert_eq!(bob.recv().await, "Joined group successfully.");

    drop(bob);
    // The exit notice is sent after cleanup, so everything below is
    // deterministic once alice has seen it.
    assert_eq!(alice.recv().await, "bob has exited the chat.");

    alice.send("/msg bob anyone there").await;
    assert_eq!(
        alice.recv().await,
        "Error: User 'bob' not found or not connected."
    );

    // The username is free again, and the old group membership is gone.
    let mut bob = Client::login_ok(addr, "bob", "builder").await;
    bob.send("/group_msg team hi").await;
    assert_eq!(bob.recv().await, "Error: You are not a member of the group.");
}

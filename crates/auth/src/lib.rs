//! Authentication for the relay.
//!
//! Two pieces: the read-only [`CredentialStore`] loaded once at startup,
//! and the [`AuthGate`] that checks credentials and enforces at most one
//! live session per username.

pub mod credentials;
pub mod gate;

pub use credentials::CredentialStore;
pub use gate::{AuthError, AuthGate};

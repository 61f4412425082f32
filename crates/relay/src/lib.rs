//! The relay core: shared state, message routing, the per-connection
//! protocol session, and the TCP accept loop.

pub mod router;
pub mod server;
pub mod session;
pub mod state;

pub use state::RelayState;

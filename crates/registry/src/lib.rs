//! The relay's shared registries.
//!
//! Each registry owns its lock and exposes only atomic async operations;
//! callers never hold a guard across other work, which keeps the locking
//! discipline local to this crate.

pub mod groups;
pub mod sessions;

pub use groups::{GroupError, GroupRegistry};
pub use sessions::{Session, SessionRegistry};

//! Wire-level protocol for the palaver chat relay.
//!
//! Everything on the wire is newline-delimited plain text: the fixed login
//! prompts and replies, the slash-command grammar clients speak once
//! authenticated, and the formatted lines the relay delivers on their
//! behalf.

pub mod command;
pub mod wire;

pub use command::{Command, CommandError};

//! The slash-command grammar.
//!
//! A command line is `<word> <argument>`; the tokenizer splits once on the
//! first space and dispatches on the word. A bare word with no argument is
//! not part of the grammar, which also preserves the historical rule that
//! every command prefix includes its trailing space.

use thiserror::Error;

// ── Types ────────────────────────────────────────────────────────────────────

/// A parsed client command, ready for dispatch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/broadcast <text>` — text may be empty and is forwarded as-is.
    Broadcast { text: String },
    /// `/msg <user> <text>`
    Private { to: String, text: String },
    /// `/group_msg <group> <text>` — the group is the first token only.
    GroupMessage { group: String, text: String },
    /// `/create_group <name>` — the name is the full remainder of the
    /// line, so group names may contain spaces.
    CreateGroup { name: String },
    /// `/join_group <name>`
    JoinGroup { name: String },
    /// `/leave_group <name>`
    LeaveGroup { name: String },
}

/// Parse failures, each carrying the exact reply line sent back to the
/// offending client. The session stays active after any of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Incorrect Format of message")]
    Unrecognized,
    #[error("Invalid command format. Use: /msg <username> <message>")]
    BadPrivateForm,
    #[error("Error: Group name or message cannot be empty.")]
    EmptyGroupField,
    #[error("Error: Group name cannot be empty.")]
    EmptyGroupName,
}

// ── Parsing ──────────────────────────────────────────────────────────────────

impl Command {
    /// Tokenize and parse one line. The caller has already stripped the
    /// trailing newline.
    pub fn parse(line: &str) -> Result<Self, CommandError> {
        let Some((word, rest)) = line.split_once(' ') else {
            return Err(CommandError::Unrecognized);
        };
        match word {
            "/broadcast" => Ok(Self::Broadcast {
                text: rest.to_string(),
            }),
            "/msg" => {
                let (to, text) = rest.split_once(' ').ok_or(CommandError::BadPrivateForm)?;
                if to.is_empty() || text.is_empty() {
                    return Err(CommandError::BadPrivateForm);
                }
                Ok(Self::Private {
                    to: to.to_string(),
                    text: text.to_string(),
                })
            },
            "/group_msg" => {
                let (group, text) = rest.split_once(' ').ok_or(CommandError::EmptyGroupField)?;
                if group.is_empty() || text.is_empty() {
                    return Err(CommandError::EmptyGroupField);
                }
                Ok(Self::GroupMessage {
                    group: group.to_string(),
                    text: text.to_string(),
                })
            },
            "/create_group" => group_name(rest).map(|name| Self::CreateGroup { name }),
            "/join_group" => group_name(rest).map(|name| Self::JoinGroup { name }),
            "/leave_group" => group_name(rest).map(|name| Self::LeaveGroup { name }),
            _ => Err(CommandError::Unrecognized),
        }
    }
}

fn group_name(rest: &str) -> Result<String, CommandError> {
    if rest.is_empty() {
        return Err(CommandError::EmptyGroupName);
    }
    Ok(rest.to_string())
}

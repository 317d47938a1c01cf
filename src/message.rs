//! Message definitions
//!
//! `Message` is the value queued in a participant's mailbox. The
//! `Command` / `Event` enums are the JSON-lines protocol spoken by the
//! in-process driver, using Serde's tagged enum for type-safe
//! serialization/deserialization.

use serde::{Deserialize, Serialize};

use crate::error::ChatError;
use crate::stats::StatsSnapshot;

/// A chat message waiting in a mailbox
///
/// Rendered as `"<from>, <body>"`; every recipient of one send gets the
/// same rendering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Message {
    /// Username of the sender
    pub from: String,
    /// Trimmed, non-empty body
    pub body: String,
}

impl Message {
    /// Build a message from a raw body
    ///
    /// The body is trimmed; an empty result is rejected.
    pub fn new(from: impl Into<String>, body: &str) -> Result<Self, ChatError> {
        let body = normalize_body(body)?;
        Ok(Self {
            from: from.into(),
            body: body.to_string(),
        })
    }

    /// The delivered text, `"<from>, <body>"`
    pub fn text(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}, {}", self.from, self.body)
    }
}

/// Trim a message body, rejecting it if nothing is left
pub fn normalize_body(body: &str) -> Result<&str, ChatError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        Err(ChatError::EmptyMessage)
    } else {
        Ok(trimmed)
    }
}

/// Driver input, one JSON object per line
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Command {
    /// Connect a new participant
    Connect { username: String },
    /// Disconnect a participant
    Disconnect { username: String },
    /// Send to every other participant
    Broadcast { from: String, body: String },
    /// Send to one named participant
    Private {
        from: String,
        to: String,
        body: String,
    },
    /// Report server counters
    Stats,
}

/// Driver output, one JSON object per line
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    /// Participant connected
    Connected { username: String },
    /// Participant disconnected
    Disconnected { username: String },
    /// A message was taken out of a participant's mailbox
    Delivered { to: String, text: String },
    /// Broadcast fan-out finished
    BroadcastSent {
        from: String,
        delivered: usize,
        dropped: usize,
        disconnected: usize,
    },
    /// Private message accepted
    PrivateSent { from: String, to: String, dropped: bool },
    /// Server counters and who is connected
    Stats {
        #[serde(flatten)]
        stats: StatsSnapshot,
        participants: Vec<String>,
    },
    /// Error occurred
    Error { code: ErrorCode, message: String },
}

/// Error codes for Event::Error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Username already connected
    UsernameTaken,
    /// Empty username
    InvalidUsername,
    /// Empty message body
    EmptyMessage,
    /// Sender not connected
    SenderDisconnected,
    /// No such recipient
    RecipientNotFound,
    /// Recipient left
    RecipientDisconnected,
    /// The driver has no session for this username
    UnknownUser,
    /// Malformed command line
    InvalidCommand,
}

impl From<&ChatError> for ErrorCode {
    fn from(err: &ChatError) -> Self {
        match err {
            ChatError::UsernameTaken(_) => ErrorCode::UsernameTaken,
            ChatError::InvalidUsername => ErrorCode::InvalidUsername,
            ChatError::EmptyMessage => ErrorCode::EmptyMessage,
            ChatError::SenderDisconnected => ErrorCode::SenderDisconnected,
            ChatError::RecipientNotFound(_) => ErrorCode::RecipientNotFound,
            ChatError::RecipientDisconnected(_) => ErrorCode::RecipientDisconnected,
        }
    }
}

/// Convert ChatError to an Event for the driver's output
impl From<ChatError> for Event {
    fn from(err: ChatError) -> Self {
        Event::Error {
            code: ErrorCode::from(&err),
            message: err.to_string(),
        }
    }
}

//! Error types for the chat room
//!
//! Defines the chat-level error taxonomy returned by the router, the
//! mailbox send error, and the errors of the stdin/stdout driver.
//! Uses thiserror for ergonomic error definitions.

use thiserror::Error;

/// Chat operation errors
///
/// Returned synchronously to the caller of the failing operation.
/// None of them are fatal to the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChatError {
    /// Another connected participant already uses this username
    #[error("Username '{0}' is already taken")]
    UsernameTaken(String),

    /// Username is empty after trimming whitespace
    #[error("Username must not be empty")]
    InvalidUsername,

    /// Message body is empty after trimming whitespace
    #[error("Message must not be empty")]
    EmptyMessage,

    /// The sender is no longer connected
    #[error("Sender is disconnected")]
    SenderDisconnected,

    /// No connected participant has this username
    #[error("Recipient '{0}' not found")]
    RecipientNotFound(String),

    /// The recipient was found but had already disconnected
    #[error("Recipient '{0}' is disconnected")]
    RecipientDisconnected(String),
}

/// Mailbox send errors
///
/// A full mailbox is not an error: see [`Delivery::Dropped`](crate::mailbox::Delivery).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SendError {
    /// The participant has disconnected and its mailbox is closed
    #[error("Participant disconnected")]
    Disconnected,
}

/// Driver errors
///
/// Covers the fatal errors of the line-oriented driver (I/O on stdin or
/// stdout, or an event that fails to serialize).
#[derive(Debug, Error)]
pub enum DriverError {
    /// IO error (fatal)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

//! In-process Chat Room Library
//!
//! A chat room core: a registry of connected participants with
//! join/leave lifecycle, room-wide broadcast, and private messages,
//! safe to drive from many tasks at once.
//!
//! # Features
//! - Unique usernames among connected participants
//! - Bounded per-participant mailboxes with drop-on-full delivery
//! - Broadcast to everyone but the sender
//! - Private messages to one named participant
//! - Disconnect closes the mailbox and releases a waiting receiver
//! - Delivery counters
//!
//! # Architecture
//! - `Registry` holds connected participants under one lock
//! - Each `Participant` guards its connected flag and mailbox under its own lock
//! - `ChatServer` routes messages by composing the two; the two locks are
//!   never held together
//! - `driver` runs JSON-lines commands against a server in-process
//!
//! # Example
//! ```
//! use chat_room::{ChatServer, Config};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let server = ChatServer::new(Config::default());
//! let alice = server.connect("alice").unwrap();
//! let bob = server.connect("bob").unwrap();
//!
//! server.broadcast(&alice, "hello").unwrap();
//! let msg = bob.receive().await.unwrap();
//! assert_eq!(msg.to_string(), "alice, hello");
//!
//! server.disconnect(&bob);
//! assert!(bob.receive().await.is_none());
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod error;
pub mod mailbox;
pub mod message;
pub mod participant;
pub mod registry;
pub mod server;
pub mod stats;
pub mod types;

// Re-export main types for convenience
pub use config::Config;
pub use error::{ChatError, DriverError, SendError};
pub use mailbox::{Delivery, TryReceiveError};
pub use message::{Command, ErrorCode, Event, Message};
pub use participant::Participant;
pub use registry::Registry;
pub use server::{BroadcastReport, ChatServer};
pub use stats::StatsSnapshot;
pub use types::ParticipantId;

//! Participant definition
//!
//! Represents a connected chat participant: identity, mailbox, and the
//! connected flag. The flag and the mailbox's open/closed state live under
//! one lock, so a sender can never see "connected" and then write into a
//! closed mailbox.

use std::time::Instant;

use parking_lot::Mutex;

use crate::error::SendError;
use crate::mailbox::{self, Delivery, Inbox, Mailbox, TryReceiveError};
use crate::message::Message;
use crate::types::ParticipantId;

/// Lifecycle state guarded by the participant lock
#[derive(Debug)]
struct Lifecycle {
    /// Connected flag; never goes back to `true`
    connected: bool,
    /// Producer side of the mailbox, closed together with the flag
    mailbox: Mailbox,
}

/// A chat participant
///
/// Created connected by [`ChatServer::connect`](crate::ChatServer::connect)
/// and shared as `Arc<Participant>` between the router and the task that
/// consumes its mailbox.
#[derive(Debug)]
pub struct Participant {
    id: ParticipantId,
    username: String,
    state: Mutex<Lifecycle>,
    inbox: Inbox,
    connected_at: Instant,
}

impl Participant {
    /// Create a connected participant with an empty mailbox
    pub fn new(username: impl Into<String>, capacity: usize) -> Self {
        let (mailbox, inbox) = mailbox::channel(capacity);
        Self {
            id: ParticipantId::new(),
            username: username.into(),
            state: Mutex::new(Lifecycle {
                connected: true,
                mailbox,
            }),
            inbox,
            connected_at: Instant::now(),
        }
    }

    /// Unique id of this participant
    pub fn id(&self) -> ParticipantId {
        self.id
    }

    /// The participant's username
    pub fn username(&self) -> &str {
        &self.username
    }

    /// When the participant connected
    pub fn connected_at(&self) -> Instant {
        self.connected_at
    }

    /// Check if the participant is still connected
    pub fn is_connected(&self) -> bool {
        self.state.lock().connected
    }

    /// Mailbox capacity
    pub fn capacity(&self) -> usize {
        self.state.lock().mailbox.capacity()
    }

    /// Number of messages waiting in the mailbox, best-effort
    ///
    /// Reports 0 while the consumer is suspended in [`Participant::receive`].
    pub fn pending(&self) -> usize {
        self.inbox.len()
    }

    /// Queue a message for this participant without blocking
    ///
    /// The connected flag is checked under the same lock that guards the
    /// mailbox. A full mailbox drops the message and returns `Dropped`.
    pub fn try_send(&self, msg: Message) -> Result<Delivery, SendError> {
        let state = self.state.lock();
        if !state.connected {
            return Err(SendError::Disconnected);
        }
        state.mailbox.try_push(msg)
    }

    /// Flip to disconnected and close the mailbox
    ///
    /// Returns `true` if this call performed the transition, `false` if the
    /// participant was already disconnected.
    pub(crate) fn mark_disconnected(&self) -> bool {
        let mut state = self.state.lock();
        if !state.connected {
            return false;
        }
        state.connected = false;
        state.mailbox.close();
        true
    }

    /// Wait for the next message
    ///
    /// Returns `None` once the participant has disconnected and every
    /// message queued before that has been received.
    pub async fn receive(&self) -> Option<Message> {
        self.inbox.recv().await
    }

    /// Take the next message if one is queued
    pub fn try_receive(&self) -> Result<Message, TryReceiveError> {
        self.inbox.try_recv()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;

    fn msg(from: &str, body: &str) -> Message {
        Message::new(from, body).unwrap()
    }

    #[test]
    fn test_participant_creation() {
        let participant = Participant::new("alice", 8);

        assert_eq!(participant.username(), "alice");
        assert!(participant.is_connected());
        assert_eq!(participant.capacity(), 8);
        assert_eq!(participant.pending(), 0);
    }

    #[tokio::test]
    async fn test_try_send_then_receive() {
        let participant = Participant::new("bob", 8);

        let delivery = participant.try_send(msg("alice", "hi bob")).unwrap();
        assert_eq!(delivery, Delivery::Enqueued);
        assert_eq!(participant.pending(), 1);

        let received = participant.receive().await.unwrap();
        assert_eq!(received.to_string(), "alice, hi bob");
    }

    #[test]
    fn test_send_after_disconnect_refused() {
        let participant = Participant::new("bob", 8);

        assert!(participant.mark_disconnected());
        assert!(!participant.is_connected());
        assert_eq!(
            participant.try_send(msg("alice", "anyone?")),
            Err(SendError::Disconnected)
        );
    }

    #[test]
    fn test_disconnect_is_terminal_and_idempotent() {
        let participant = Participant::new("bob", 8);

        assert!(participant.mark_disconnected());
        assert!(!participant.mark_disconnected());
        assert!(!participant.is_connected());
    }

    #[tokio::test]
    async fn test_queued_messages_survive_disconnect() {
        let participant = Participant::new("bob", 8);
        participant.try_send(msg("alice", "first")).unwrap();
        participant.try_send(msg("alice", "second")).unwrap();
        participant.mark_disconnected();

        assert_eq!(participant.receive().await.unwrap().body, "first");
        assert_eq!(participant.receive().await.unwrap().body, "second");
        assert!(participant.receive().await.is_none());
        assert_eq!(participant.try_receive(), Err(TryReceiveError::Closed));
    }

    #[tokio::test]
    async fn test_disconnect_releases_blocked_receive() {
        let participant = Arc::new(Participant::new("bob", 8));

        let consumer = {
            let participant = participant.clone();
            tokio::spawn(async move { participant.receive().await })
        };
        tokio::time::sleep(Duration::from_millis(20)).await;
        participant.mark_disconnected();

        let received = tokio::time::timeout(Duration::from_secs(1), consumer)
            .await
            .expect("receive stayed blocked after disconnect")
            .unwrap();
        assert!(received.is_none());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_no_send_accepted_after_flag_flip() {
        let participant = Arc::new(Participant::new("bob", 1024));

        let mut senders = Vec::new();
        for t in 0..4 {
            let participant = participant.clone();
            senders.push(tokio::spawn(async move {
                let mut accepted = 0usize;
                for i in 0..200 {
                    match participant.try_send(msg("alice", &format!("{t}-{i}"))) {
                        Ok(Delivery::Enqueued) => accepted += 1,
                        Ok(Delivery::Dropped) => {}
                        Err(SendError::Disconnected) => break,
                    }
                    tokio::task::yield_now().await;
                }
                accepted
            }));
        }

        tokio::time::sleep(Duration::from_millis(5)).await;
        participant.mark_disconnected();

        let mut accepted = 0;
        for sender in senders {
            accepted += sender.await.unwrap();
        }

        let mut received = 0;
        while participant.receive().await.is_some() {
            received += 1;
        }
        assert_eq!(received, accepted);
    }
}

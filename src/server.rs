//! ChatServer router
//!
//! Implements connect, disconnect, broadcast and private messages by
//! composing [`Registry`] and [`Participant`] operations. Every method
//! takes `&self` and may be called from any number of tasks at once;
//! none of them block on another participant.

use std::sync::Arc;

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{ChatError, SendError};
use crate::mailbox::Delivery;
use crate::message::Message;
use crate::participant::Participant;
use crate::registry::Registry;
use crate::stats::{ServerStats, StatsSnapshot};

/// Per-recipient outcome counts of one broadcast
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BroadcastReport {
    /// Recipients whose mailbox accepted the message
    pub delivered: usize,
    /// Recipients whose mailbox was full
    pub dropped: usize,
    /// Recipients that disconnected after the snapshot was taken
    pub disconnected: usize,
}

impl BroadcastReport {
    fn record(&mut self, outcome: Result<Delivery, SendError>) {
        match outcome {
            Ok(Delivery::Enqueued) => self.delivered += 1,
            Ok(Delivery::Dropped) => self.dropped += 1,
            Err(SendError::Disconnected) => self.disconnected += 1,
        }
    }

    /// Number of recipients the broadcast was attempted for
    pub fn attempted(&self) -> usize {
        self.delivered + self.dropped + self.disconnected
    }
}

/// The chat server
///
/// Owns the registry and the counters. Share it as `Arc<ChatServer>`.
#[derive(Debug)]
pub struct ChatServer {
    registry: Registry,
    stats: ServerStats,
    config: Config,
}

impl Default for ChatServer {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl ChatServer {
    /// Create a server with no participants
    pub fn new(config: Config) -> Self {
        Self {
            registry: Registry::new(config.mailbox_capacity),
            stats: ServerStats::default(),
            config,
        }
    }

    /// Connect a new participant
    ///
    /// Fails with `UsernameTaken` while another connected participant has
    /// the same username.
    pub fn connect(&self, username: &str) -> Result<Arc<Participant>, ChatError> {
        let participant = self.registry.insert(username)?;
        self.stats.record_connect();

        info!("Participant '{}' connected ({})", username, participant.id());
        debug!("Total participants: {}", self.registry.len());
        Ok(participant)
    }

    /// Disconnect a participant
    ///
    /// Removes it from the registry, then marks it disconnected and closes
    /// its mailbox. A no-op if it is no longer registered.
    pub fn disconnect(&self, participant: &Participant) {
        // Registry lock is released before the participant lock is taken.
        if !self.registry.remove(participant) {
            debug!(
                "Participant '{}' ({}) already disconnected",
                participant.username(),
                participant.id()
            );
            return;
        }

        participant.mark_disconnected();
        self.stats.record_disconnect();

        info!(
            "Participant '{}' disconnected ({}) after {:?}",
            participant.username(),
            participant.id(),
            participant.connected_at().elapsed()
        );
        debug!("Total participants: {}", self.registry.len());
    }

    /// Send a message to every other connected participant
    ///
    /// Delivery to each recipient is best-effort: full mailboxes and
    /// concurrent disconnects are counted in the report, not returned as
    /// errors.
    pub fn broadcast(&self, sender: &Participant, body: &str) -> Result<BroadcastReport, ChatError> {
        let msg = Message::new(sender.username(), body)?;
        if !sender.is_connected() {
            return Err(ChatError::SenderDisconnected);
        }

        let mut report = BroadcastReport::default();
        for recipient in self.registry.snapshot() {
            if recipient.id() == sender.id() {
                continue;
            }
            let outcome = recipient.try_send(msg.clone());
            self.stats.record_send(&outcome);
            report.record(outcome);
        }

        debug!(
            "Broadcast from '{}': delivered={}, dropped={}, disconnected={}",
            sender.username(),
            report.delivered,
            report.dropped,
            report.disconnected
        );
        Ok(report)
    }

    /// Send a message to one named participant
    ///
    /// A full recipient mailbox still counts as success; the returned
    /// [`Delivery`] says whether the message was queued or dropped.
    pub fn private_message(
        &self,
        sender: &Participant,
        recipient: &str,
        body: &str,
    ) -> Result<Delivery, ChatError> {
        let msg = Message::new(sender.username(), body)?;
        if !sender.is_connected() {
            return Err(ChatError::SenderDisconnected);
        }

        let Some(target) = self.registry.lookup(recipient) else {
            return Err(ChatError::RecipientNotFound(recipient.to_string()));
        };
        if !target.is_connected() {
            return Err(ChatError::RecipientDisconnected(recipient.to_string()));
        }

        let delivery = self.deliver_private(&target, msg);
        debug!(
            "Private message '{}' -> '{}': {:?}",
            sender.username(),
            recipient,
            delivery
        );
        Ok(delivery)
    }

    /// Queue a private message into an already looked-up recipient
    ///
    /// A recipient that disconnected after the connected check is treated
    /// like a full mailbox: the message is dropped and counted as refused.
    pub(crate) fn deliver_private(&self, target: &Participant, msg: Message) -> Delivery {
        let outcome = target.try_send(msg);
        self.stats.record_send(&outcome);
        outcome.unwrap_or(Delivery::Dropped)
    }

    /// Find a connected participant by username
    pub fn lookup(&self, username: &str) -> Option<Arc<Participant>> {
        self.registry.lookup(username)
    }

    /// Sorted usernames of everyone connected
    pub fn usernames(&self) -> Vec<String> {
        self.registry.usernames()
    }

    /// Number of connected participants
    pub fn participant_count(&self) -> usize {
        self.registry.len()
    }

    /// Current counters
    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot(self.registry.len())
    }

    /// The configuration this server was built with
    pub fn config(&self) -> &Config {
        &self.config
    }
}

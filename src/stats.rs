//! Delivery counters
//!
//! Lock-free counters updated by the router and exposed as a
//! serializable snapshot.

use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;

use crate::error::SendError;
use crate::mailbox::Delivery;

/// Running server counters
#[derive(Debug, Default)]
pub struct ServerStats {
    connects: AtomicU64,
    disconnects: AtomicU64,
    enqueued: AtomicU64,
    dropped: AtomicU64,
    refused: AtomicU64,
}

impl ServerStats {
    pub(crate) fn record_connect(&self) {
        self.connects.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_disconnect(&self) {
        self.disconnects.fetch_add(1, Ordering::Relaxed);
    }

    /// Count the outcome of one send attempt
    pub(crate) fn record_send(&self, outcome: &Result<Delivery, SendError>) {
        let counter = match outcome {
            Ok(Delivery::Enqueued) => &self.enqueued,
            Ok(Delivery::Dropped) => &self.dropped,
            Err(SendError::Disconnected) => &self.refused,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Read every counter
    pub fn snapshot(&self, connected: usize) -> StatsSnapshot {
        StatsSnapshot {
            connected,
            connects: self.connects.load(Ordering::Relaxed),
            disconnects: self.disconnects.load(Ordering::Relaxed),
            enqueued: self.enqueued.load(Ordering::Relaxed),
            dropped: self.dropped.load(Ordering::Relaxed),
            refused: self.refused.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of the server counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StatsSnapshot {
    /// Participants registered when the snapshot was taken
    pub connected: usize,
    /// Successful connects
    pub connects: u64,
    /// Completed disconnects
    pub disconnects: u64,
    /// Messages queued into a mailbox
    pub enqueued: u64,
    /// Messages discarded because a mailbox was full
    pub dropped: u64,
    /// Sends refused because the recipient had disconnected
    pub refused: u64,
}

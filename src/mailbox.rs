//! Bounded participant mailbox
//!
//! A mailbox is a bounded `mpsc` channel split in two halves:
//! - [`Mailbox`]: the producer side, kept under the participant's lock.
//!   Pushing never blocks; a full mailbox drops the message.
//! - [`Inbox`]: the consumer side, read in FIFO order by a single consumer.
//!
//! Closing the mailbox drops the only sender. The inbox then yields the
//! messages already queued and reports closed afterwards.

use tokio::sync::{mpsc, Mutex};

use crate::error::SendError;
use crate::message::Message;

/// Default mailbox capacity
pub const DEFAULT_CAPACITY: usize = 8;

/// Outcome of a non-blocking push into an open mailbox
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    /// The message was queued
    Enqueued,
    /// The mailbox was full and the message was discarded
    Dropped,
}

impl Delivery {
    /// Whether the message was queued
    pub fn is_enqueued(self) -> bool {
        matches!(self, Delivery::Enqueued)
    }
}

/// Why a non-blocking receive returned nothing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TryReceiveError {
    /// Nothing queued right now
    Empty,
    /// The mailbox is closed and drained
    Closed,
}

/// Create a mailbox with room for `capacity` messages
///
/// A capacity of zero is raised to one.
pub fn channel(capacity: usize) -> (Mailbox, Inbox) {
    let capacity = capacity.max(1);
    let (tx, rx) = mpsc::channel(capacity);
    (
        Mailbox {
            sender: Some(tx),
            capacity,
        },
        Inbox {
            receiver: Mutex::new(rx),
        },
    )
}

/// Producer side of a participant mailbox
#[derive(Debug)]
pub struct Mailbox {
    /// `None` once closed
    sender: Option<mpsc::Sender<Message>>,
    capacity: usize,
}

impl Mailbox {
    /// Queue a message without blocking
    ///
    /// Returns `Dropped` when the mailbox is full and `SendError::Disconnected`
    /// when it is closed (or its inbox is gone).
    pub fn try_push(&self, msg: Message) -> Result<Delivery, SendError> {
        let Some(sender) = &self.sender else {
            return Err(SendError::Disconnected);
        };

        match sender.try_send(msg) {
            Ok(()) => Ok(Delivery::Enqueued),
            Err(mpsc::error::TrySendError::Full(_)) => Ok(Delivery::Dropped),
            Err(mpsc::error::TrySendError::Closed(_)) => Err(SendError::Disconnected),
        }
    }

    /// Close the mailbox for further writes
    ///
    /// Queued messages stay readable from the inbox. Closing twice is a no-op.
    pub fn close(&mut self) {
        self.sender = None;
    }

    /// Check if the mailbox has been closed
    pub fn is_closed(&self) -> bool {
        self.sender.is_none()
    }

    /// Maximum number of queued messages
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

/// Consumer side of a participant mailbox
///
/// The receiver sits behind an async mutex so concurrent readers are
/// serialized instead of racing for the same channel.
#[derive(Debug)]
pub struct Inbox {
    receiver: Mutex<mpsc::Receiver<Message>>,
}

impl Inbox {
    /// Wait for the next message
    ///
    /// Returns `None` once the mailbox is closed and every message queued
    /// before the close has been received.
    pub async fn recv(&self) -> Option<Message> {
        self.receiver.lock().await.recv().await
    }

    /// Take the next message if one is queued
    ///
    /// While another task is suspended in [`Inbox::recv`] the queue is
    /// empty from this caller's point of view.
    pub fn try_recv(&self) -> Result<Message, TryReceiveError> {
        let Ok(mut receiver) = self.receiver.try_lock() else {
            return Err(TryReceiveError::Empty);
        };

        receiver.try_recv().map_err(|e| match e {
            mpsc::error::TryRecvError::Empty => TryReceiveError::Empty,
            mpsc::error::TryRecvError::Disconnected => TryReceiveError::Closed,
        })
    }

    /// Number of queued messages, best-effort
    ///
    /// Reports 0 while a consumer is suspended in [`Inbox::recv`], even if
    /// a message has just been queued for it.
    pub fn len(&self) -> usize {
        self.receiver.try_lock().map_or(0, |receiver| receiver.len())
    }

    /// Check if no messages are queued
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

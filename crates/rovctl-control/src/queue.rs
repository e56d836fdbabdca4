use std::time::Duration;

use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TrySendError};
use tracing::{debug, error, warn};

use crate::command::DecodedCommand;

/// Number of commands buffered between receiver and dispatcher.
pub const QUEUE_CAPACITY: usize = 10;

/// Result of a non-blocking [`CommandQueue::put`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    Queued,
    /// The queue was full; the offered command was discarded.
    Dropped,
}

/// Bounded FIFO between the receiver and the dispatcher.
///
/// `put` never blocks: when full, the incoming command is dropped and the
/// buffered ones are kept. `get` blocks until a command is available.
/// Clones share the same buffer.
#[derive(Debug, Clone)]
pub struct CommandQueue {
    tx: Sender<DecodedCommand>,
    rx: Receiver<DecodedCommand>,
}

impl CommandQueue {
    pub fn new() -> Self {
        let (tx, rx) = crossbeam_channel::bounded(QUEUE_CAPACITY);
        Self { tx, rx }
    }

    pub fn put(&self, command: DecodedCommand) -> PutOutcome {
        match self.tx.try_send(command) {
            Ok(()) => {
                debug!(sequence = command.sequence, "command queued");
                PutOutcome::Queued
            }
            Err(TrySendError::Full(dropped)) => {
                warn!(sequence = dropped.sequence, "command queue full, command dropped");
                PutOutcome::Dropped
            }
            // Unreachable while `self` holds the receiving end.
            Err(TrySendError::Disconnected(dropped)) => {
                error!(sequence = dropped.sequence, "command queue disconnected, command dropped");
                PutOutcome::Dropped
            }
        }
    }

    /// Block until a command is available.
    ///
    /// Returns `None` only if every sender is gone, which cannot happen while
    /// this handle is alive.
    pub fn get(&self) -> Option<DecodedCommand> {
        self.rx.recv().ok()
    }

    /// Wait at most `timeout` for a command.
    pub fn get_timeout(&self, timeout: Duration) -> Option<DecodedCommand> {
        match self.rx.recv_timeout(timeout) {
            Ok(command) => Some(command),
            Err(RecvTimeoutError::Timeout) | Err(RecvTimeoutError::Disconnected) => None,
        }
    }

    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }

    pub fn capacity(&self) -> usize {
        QUEUE_CAPACITY
    }
}

impl Default for CommandQueue {
    fn default() -> Self {
        Self::new()
    }
}

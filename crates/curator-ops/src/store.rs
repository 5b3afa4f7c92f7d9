//! Selection store seam.
//!
//! Interactive selections are not applied directly: they are dispatched to a
//! store, and the store's observer feeds them back to the coordinator. This
//! keeps the store the single writer of "what the user asked for".

use tokio::sync::mpsc;
use tracing::warn;

use crate::selection::SelectionPayload;

/// Receives dispatched selections.
pub trait SelectionStore: Send + Sync {
    /// Record a requested selection.
    fn dispatch(&self, payload: SelectionPayload);
}

/// In-process store backed by an unbounded channel.
#[derive(Debug, Clone)]
pub struct ChannelStore {
    sender: mpsc::UnboundedSender<SelectionPayload>,
}

impl ChannelStore {
    /// Create the store and the receiver its observer drains.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<SelectionPayload>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl SelectionStore for ChannelStore {
    fn dispatch(&self, payload: SelectionPayload) {
        if self.sender.send(payload).is_err() {
            warn!("Selection store observer is gone; dropping dispatch");
        }
    }
}

/// Store that only records dispatches; useful when the caller drives the
/// observer side by hand.
#[derive(Debug, Default)]
pub struct RecordingStore {
    dispatched: std::sync::Mutex<Vec<SelectionPayload>>,
}

impl RecordingStore {
    /// Create an empty recorder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Take every payload recorded so far.
    pub fn drain(&self) -> Vec<SelectionPayload> {
        match self.dispatched.lock() {
            Ok(mut dispatched) => std::mem::take(&mut *dispatched),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        }
    }
}

impl SelectionStore for RecordingStore {
    fn dispatch(&self, payload: SelectionPayload) {
        match self.dispatched.lock() {
            Ok(mut dispatched) => dispatched.push(payload),
            Err(poisoned) => poisoned.into_inner().push(payload),
        }
    }
}

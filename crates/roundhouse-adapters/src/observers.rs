//! Change observers.

use std::sync::mpsc::{self, Receiver, Sender};

use tracing::{debug, trace};

use roundhouse_core::application::ports::{ChangeEvent, ChangeObserver};

/// Forwards every change over a channel.
///
/// Sending never blocks. Once the receiver is dropped, events are discarded.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: Sender<ChangeEvent>,
}

impl ChannelObserver {
    /// Create an observer and the receiving end of its channel.
    pub fn channel() -> (Self, Receiver<ChangeEvent>) {
        let (sender, receiver) = mpsc::channel();
        (Self { sender }, receiver)
    }
}

impl ChangeObserver for ChannelObserver {
    fn on_change(&self, event: &ChangeEvent) {
        if self.sender.send(*event).is_err() {
            trace!(%event, "Change receiver gone, event dropped");
        }
    }
}

/// Logs every change at debug level.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ChangeObserver for TracingObserver {
    fn on_change(&self, event: &ChangeEvent) {
        debug!(kind = %event.kind, entity = %event.entity, "Collection changed");
    }
}

//! Control event channel
//!
//! UI chrome (tray menu, hotkey handler, settings dialog) lives outside the
//! rendering core. Whatever it is, it talks to the frame scheduler through
//! this channel: discrete events queued from anywhere, drained once per
//! tick into the scheduler's snapshot.

use std::sync::mpsc::{channel, Receiver, Sender};

use crate::config::ShapeMode;

/// A discrete command for the frame scheduler
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ControlEvent {
    /// Flip the latched pause state
    PauseToggled,
    /// Discard every retained trail point
    Clear,
    /// Switch the active drawing mode
    ShapeMode(ShapeMode),
    /// Shut the application down
    Quit,
}

/// Cloneable sending half of the control channel
#[derive(Clone)]
pub struct ControlSender {
    tx: Sender<ControlEvent>,
}

impl ControlSender {
    /// Queue an event; delivery failures (receiver gone during shutdown)
    /// are ignored.
    pub fn send(&self, event: ControlEvent) {
        if self.tx.send(event).is_err() {
            tracing::debug!(?event, "control queue receiver dropped");
        }
    }
}

/// The receiving half, owned by whichever loop drives the scheduler
pub struct ControlQueue {
    tx: Sender<ControlEvent>,
    rx: Receiver<ControlEvent>,
}

impl ControlQueue {
    pub fn new() -> Self {
        let (tx, rx) = channel();
        Self { tx, rx }
    }

    /// A new sender for UI chrome to hold on to
    pub fn sender(&self) -> ControlSender {
        ControlSender {
            tx: self.tx.clone(),
        }
    }

    /// Drain everything queued since the last tick, in arrival order.
    pub fn drain(&self) -> Vec<ControlEvent> {
        self.rx.try_iter().collect()
    }
}

impl Default for ControlQueue {
    fn default() -> Self {
        Self::new()
    }
}

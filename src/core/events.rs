//! Events marshalled from background threads onto the UI thread

use super::state::DeviceState;
use crate::gpio::ButtonAction;
use once_cell::sync::OnceCell;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Wrapper around `mpsc::UnboundedSender<AppEvent>` that also asks egui for a
/// repaint after every send, so the UI thread drains the queue promptly even
/// while idle.
#[derive(Clone)]
pub struct EventSender {
    tx: mpsc::UnboundedSender<AppEvent>,
    ctx: Arc<OnceCell<egui::Context>>,
}

impl EventSender {
    /// Create a sender/receiver pair. The receiver is drained by the UI thread
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<AppEvent>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (
            Self {
                tx,
                ctx: Arc::new(OnceCell::new()),
            },
            rx,
        )
    }

    /// Attach the UI context once it exists. Events sent earlier are queued
    pub fn attach(&self, ctx: egui::Context) {
        let _ = self.ctx.set(ctx);
    }

    pub fn send(&self, event: AppEvent) -> Result<(), mpsc::error::SendError<AppEvent>> {
        let result = self.tx.send(event);
        if let Some(ctx) = self.ctx.get() {
            ctx.request_repaint();
        }
        result
    }
}

/// Application-wide events for the lamp UI
#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    /// Device reported a state change
    DeviceState(DeviceState),

    /// Physical button pressed
    Button(ButtonAction),

    /// Device event loop exited
    DeviceStopped,

    /// DPP bootstrap finished: the URI, or the error text
    DppBootstrap(Result<String, String>),
}

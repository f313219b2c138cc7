//! Lamp worker and lamp screen controller

use super::device_ui::{DeviceController, DeviceImage, DeviceUi, OutputKind, UiButton};
use crate::core::events::{AppEvent, EventSender};
use crate::core::state::DeviceState;
use crate::device::{Lamp, StateCallback};
use anyhow::{anyhow, Context, Result};
use parking_lot::Mutex;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use tracing::{debug, error, info, warn};

/// Owns the lamp device and runs its event loop on a dedicated thread
pub struct LampWorker<L: Lamp + 'static> {
    device: Arc<L>,
    sender: EventSender,
    thread: Mutex<Option<JoinHandle<()>>>,
}

impl<L: Lamp + 'static> LampWorker<L> {
    pub fn new(device: Arc<L>, sender: EventSender) -> Self {
        Self {
            device,
            sender,
            thread: Mutex::new(None),
        }
    }

    /// Callback for the device constructor: re-emits every state report as
    /// an [`AppEvent::DeviceState`] on the UI queue
    pub fn state_callback(sender: EventSender) -> StateCallback {
        Box::new(move |state| {
            debug!("State update called...");
            debug!("Current state: {}", state);
            if sender.send(AppEvent::DeviceState(state)).is_err() {
                debug!("UI closed, dropping state update");
            }
        })
    }

    pub fn device(&self) -> &L {
        &self.device
    }

    pub fn is_running(&self) -> bool {
        self.thread.lock().as_ref().is_some_and(|t| !t.is_finished())
    }

    /// Start the event loop thread. Does nothing if it is already running
    pub fn run(&self) -> Result<()> {
        let mut thread = self.thread.lock();
        if thread.as_ref().is_some_and(|t| !t.is_finished()) {
            warn!("Lamp event loop already running");
            return Ok(());
        }

        debug!("Thread run called");
        let device = Arc::clone(&self.device);
        let sender = self.sender.clone();
        let handle = thread::Builder::new()
            .name("lamp-event-loop".to_string())
            .spawn(move || {
                if let Err(e) = device.main_event_loop() {
                    error!("Lamp event loop failed: {}", e);
                }
                let _ = sender.send(AppEvent::DeviceStopped);
            })
            .context("Failed to spawn lamp event loop thread")?;

        *thread = Some(handle);
        Ok(())
    }

    /// Stop the event loop and join its thread
    pub fn stop(&self) -> Result<()> {
        debug!("Stopping lamp worker");
        self.device.stop_main_loop();
        if let Some(handle) = self.thread.lock().take() {
            handle
                .join()
                .map_err(|_| anyhow!("Lamp event loop thread panicked"))?;
        }
        Ok(())
    }
}

/// Lamp screen: the generic device UI plus the lamp worker
pub struct LampUi<L: Lamp + 'static> {
    ui: DeviceUi,
    worker: LampWorker<L>,
}

impl<L: Lamp + 'static> LampUi<L> {
    pub fn new(ui: DeviceUi, worker: LampWorker<L>) -> Self {
        let mut lamp_ui = Self { ui, worker };
        lamp_ui.set_buttons();
        lamp_ui.retranslate_ui();
        lamp_ui
    }

    pub fn worker(&self) -> &LampWorker<L> {
        &self.worker
    }
}

impl<L: Lamp + 'static> DeviceController for LampUi<L> {
    fn ui(&self) -> &DeviceUi {
        &self.ui
    }

    fn ui_mut(&mut self) -> &mut DeviceUi {
        &mut self.ui
    }

    fn set_buttons(&mut self) {
        self.ui.reset_buttons();
        // A lamp is discovered, it never discovers
        self.ui.buttons.set_enabled(UiButton::Discover, false);
    }

    fn retranslate_ui(&mut self) {
        self.ui.buttons.set_text(UiButton::Toggle, "Toggle");
    }

    fn toggle_switch(&mut self) {
        debug!("Toggle button pressed");
        if self.ui.qr_code_shown() {
            self.ui.toggle_qr_code();
        }

        debug!("Toggling light");
        if let Err(e) = self.worker.device().toggle_lamp() {
            error!("Toggle failed: {}", e);
            self.ui
                .append_output_text(OutputKind::Error, format!("Toggle failed: {}", e));
        }
    }

    fn state_update_ui(&mut self, state: &DeviceState) {
        debug!("State update called...");
        debug!("Current state: {}", state);
        if state.error_state {
            error!("Error flag set");
            self.ui
                .append_output_text(OutputKind::Error, state.decoded_error());
            return;
        }
        self.ui.image = if state.state {
            DeviceImage::On
        } else {
            DeviceImage::Off
        };
    }

    fn start(&mut self) -> Result<()> {
        info!("Starting lamp on {}", self.ui.iface_name());
        self.worker.run()
    }

    fn stop(&mut self) {
        if let Err(e) = self.worker.stop() {
            error!("{:#}", e);
        }
    }
}

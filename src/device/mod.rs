//! Device module - the OCF device contract consumed by both front-ends
//!
//! The OCF state machine and DPP engine live behind these traits. The front-ends
//! only construct a device, run its event loop on a background thread, invoke
//! actions, and render the state reported through the callback.

mod sim;

use crate::core::state::DeviceState;
use std::path::PathBuf;
use thiserror::Error;

pub use sim::{SimLamp, SimSwitch, LAMP_STATE_FILE};

/// Callback invoked from the device event loop thread on every state change
pub type StateCallback = Box<dyn Fn(DeviceState) + Send + Sync>;

#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("device event loop is not accepting commands")]
    LoopClosed,
    #[error("device event loop is already running")]
    LoopRunning,
    #[error("credentials directory {path:?}: {source}")]
    Creds {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("persisted state: {0}")]
    Persist(#[from] serde_json::Error),
}

/// Construction parameters shared by every device
#[derive(Debug, Clone, Default)]
pub struct DeviceOptions {
    /// wpa_supplicant control interface the device binds to
    pub iface: String,
    /// Credentials directory
    pub creds_dir: Option<PathBuf>,
    /// Keep credentials and state across restarts
    pub persist_creds: bool,
}

impl DeviceOptions {
    pub fn new(iface: impl Into<String>) -> Self {
        Self {
            iface: iface.into(),
            ..Self::default()
        }
    }

    pub fn with_creds_dir(mut self, creds_dir: Option<PathBuf>) -> Self {
        self.creds_dir = creds_dir;
        self
    }

    pub fn with_persist_creds(mut self, persist_creds: bool) -> Self {
        self.persist_creds = persist_creds;
        self
    }
}

/// An OCF device with its own blocking event loop
pub trait OcfDevice: Send + Sync {
    /// Process device events until [`OcfDevice::stop_main_loop`] is called
    fn main_event_loop(&self) -> Result<(), DeviceError>;

    /// Ask the event loop to return. Safe to call from any thread, before or
    /// after the loop started
    fn stop_main_loop(&self);
}

/// Light switch client: finds a light and toggles it
pub trait LightSwitch: OcfDevice {
    fn discover_light(&self) -> Result<(), DeviceError>;
    fn toggle_light(&self) -> Result<(), DeviceError>;
}

/// Lamp server: owns the light
pub trait Lamp: OcfDevice {
    fn toggle_lamp(&self) -> Result<(), DeviceError>;
}

//! Slined onboarding front-ends
//!
//! Operator-facing front-ends for OCF devices onboarded over Wi-Fi DPP.
//!
//! # Features
//! - Line-menu CLI driving a light switch (discover, toggle, show DPP URI)
//! - Touchscreen GUI for the lamp with physical GPIO buttons
//! - DPP bootstrap URI generation and listen through the wpa_supplicant
//!   control interface
//! - Simulated switch and lamp for bench setups

pub mod cli;
pub mod core;
pub mod device;
pub mod gpio;
pub mod gui;
pub mod wpa;

pub use crate::core::config::Config;
pub use crate::core::env::{Env, EnvError, RunMode};
pub use crate::core::events::AppEvent;
pub use crate::core::state::DeviceState;
pub use device::{DeviceError, DeviceOptions, Lamp, LightSwitch, OcfDevice};

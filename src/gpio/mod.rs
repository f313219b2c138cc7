//! GPIO module - physical buttons next to the lamp touchscreen
//!
//! Each button is watched on its own thread and turned into an
//! [`AppEvent::Button`](crate::core::events::AppEvent::Button) for the UI thread.

#[cfg(target_os = "linux")]
mod cdev;

use crate::core::config::GpioConfig;
use crate::core::env::RunMode;
use crate::core::events::EventSender;
use std::thread::JoinHandle;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GpioError {
    #[cfg(target_os = "linux")]
    #[error("GPIO error {0}")]
    Cdev(#[from] gpio_cdev::Error),
    #[error("failed to spawn button thread: {0}")]
    Spawn(#[from] std::io::Error),
    #[error("GPIO buttons are only supported on Linux")]
    Unsupported,
}

/// What a physical button does
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonAction {
    /// Show or hide the DPP QR code overlay
    ToggleQrCode,
    /// Toggle the lamp
    ToggleLamp,
    /// Close the window (dev)
    CloseWindow,
    /// Reboot the host (prod)
    Reboot,
}

/// A pin and the action bound to it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ButtonBinding {
    pub pin: u32,
    pub action: ButtonAction,
}

/// Pin assignments for the lamp. The power button closes the window in dev
/// and reboots the host in production
pub fn button_bindings(config: &GpioConfig, mode: RunMode) -> Vec<ButtonBinding> {
    let power = match mode {
        RunMode::Dev => ButtonAction::CloseWindow,
        RunMode::Prod => ButtonAction::Reboot,
    };
    vec![
        ButtonBinding {
            pin: config.qr_pin,
            action: ButtonAction::ToggleQrCode,
        },
        ButtonBinding {
            pin: config.lamp_pin,
            action: ButtonAction::ToggleLamp,
        },
        ButtonBinding {
            pin: config.power_pin,
            action: power,
        },
    ]
}

/// Drops edges that follow an accepted edge within the debounce window
#[derive(Debug)]
pub struct Debouncer {
    window_ns: u64,
    last_ns: Option<u64>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window_ns: u64::try_from(window.as_nanos()).unwrap_or(u64::MAX),
            last_ns: None,
        }
    }

    /// Whether an edge at `timestamp_ns` counts as a new press.
    ///
    /// Event timestamps may come from the realtime clock, so an edge older
    /// than the last accepted one means the clock stepped back; it starts a
    /// new window instead of being swallowed.
    pub fn accept(&mut self, timestamp_ns: u64) -> bool {
        match self.last_ns {
            Some(last) if timestamp_ns >= last && timestamp_ns - last < self.window_ns => false,
            _ => {
                self.last_ns = Some(timestamp_ns);
                true
            }
        }
    }
}

/// Button watcher threads. They live until the process exits
pub struct ButtonWatcher {
    _threads: Vec<JoinHandle<()>>,
}

/// Start watching every binding, forwarding presses to `sender`
#[cfg(target_os = "linux")]
pub fn watch_buttons(
    config: &GpioConfig,
    bindings: &[ButtonBinding],
    sender: EventSender,
) -> Result<ButtonWatcher, GpioError> {
    let threads = cdev::spawn_watchers(config, bindings, sender)?;
    Ok(ButtonWatcher { _threads: threads })
}

#[cfg(not(target_os = "linux"))]
pub fn watch_buttons(
    _config: &GpioConfig,
    _bindings: &[ButtonBinding],
    _sender: EventSender,
) -> Result<ButtonWatcher, GpioError> {
    Err(GpioError::Unsupported)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bindings_dev() {
        let bindings = button_bindings(&GpioConfig::default(), RunMode::Dev);
        assert_eq!(
            bindings,
            vec![
                ButtonBinding { pin: 17, action: ButtonAction::ToggleQrCode },
                ButtonBinding { pin: 23, action: ButtonAction::ToggleLamp },
                ButtonBinding { pin: 27, action: ButtonAction::CloseWindow },
            ]
        );
    }

    #[test]
    fn test_bindings_prod() {
        let bindings = button_bindings(&GpioConfig::default(), RunMode::Prod);
        assert_eq!(bindings[2], ButtonBinding { pin: 27, action: ButtonAction::Reboot });
    }

    #[test]
    fn test_debouncer() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let ms = 1_000_000u64;
        assert!(debouncer.accept(1_000 * ms));
        assert!(!debouncer.accept(1_100 * ms));
        assert!(!debouncer.accept(1_299 * ms));
        assert!(debouncer.accept(1_300 * ms));
        assert!(debouncer.accept(5_000 * ms));
    }

    #[test]
    fn test_debouncer_clock_going_backwards() {
        let mut debouncer = Debouncer::new(Duration::from_millis(300));
        let ms = 1_000_000u64;
        let hour = 3_600_000 * ms;
        assert!(debouncer.accept(2 * hour));

        // Clock stepped back an hour: presses keep working and debounce
        // relative to the new clock
        assert!(debouncer.accept(hour));
        assert!(!debouncer.accept(hour + 100 * ms));
        for second in 1..10 {
            assert!(debouncer.accept(hour + second * 1_000 * ms));
        }
    }
}

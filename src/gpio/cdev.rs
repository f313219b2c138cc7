//! Button watchers on the Linux GPIO character device

use super::{ButtonBinding, Debouncer, GpioError};
use crate::core::config::GpioConfig;
use crate::core::events::{AppEvent, EventSender};
use gpio_cdev::{Chip, EventRequestFlags, LineRequestFlags};
use std::thread::{self, JoinHandle};
use std::time::Duration;
use tracing::{debug, info, warn};

const CONSUMER: &str = "slined-onboarding";

/// Request a falling-edge event handle per binding and watch each on a thread.
/// Buttons are active-low; pull-ups come from the board or device tree.
pub(super) fn spawn_watchers(
    config: &GpioConfig,
    bindings: &[ButtonBinding],
    sender: EventSender,
) -> Result<Vec<JoinHandle<()>>, GpioError> {
    let mut chip = Chip::new(&config.chip)?;
    let debounce = Duration::from_millis(config.debounce_ms);
    let mut threads = Vec::with_capacity(bindings.len());

    for binding in bindings.iter().copied() {
        let line = chip.get_line(binding.pin)?;
        let events = line.events(
            LineRequestFlags::INPUT,
            EventRequestFlags::FALLING_EDGE,
            CONSUMER,
        )?;
        let sender = sender.clone();

        let handle = thread::Builder::new()
            .name(format!("gpio-{}", binding.pin))
            .spawn(move || {
                let mut debouncer = Debouncer::new(debounce);
                for event in events {
                    match event {
                        Ok(event) => {
                            if !debouncer.accept(event.timestamp()) {
                                continue;
                            }
                            debug!("GPIO {} pressed -> {:?}", binding.pin, binding.action);
                            if sender.send(AppEvent::Button(binding.action)).is_err() {
                                break;
                            }
                        }
                        Err(e) => {
                            warn!("GPIO {} event error: {}", binding.pin, e);
                            break;
                        }
                    }
                }
                debug!("GPIO {} watcher stopped", binding.pin);
            })?;

        info!("Button on GPIO {} bound to {:?}", binding.pin, binding.action);
        threads.push(handle);
    }

    Ok(threads)
}

//! Prompt loop for the switch CLI
//!
//! The switch event loop runs on a background thread and reports state
//! through [`CliShared::state_callback`]. Before every menu the prompt thread
//! waits on a condition variable for such a report, so the state block lands
//! above the menu rather than in the middle of it.

use super::console::Console;
use super::menu::{format_error, format_state, menu_text, parse_selection, MenuSelection};
use crate::core::env::{EnvError, SO_IFACE};
use crate::core::state::DeviceState;
use crate::device::{LightSwitch, StateCallback};
use crate::wpa::{get_dpp_uri, start_dpp_listen, DppSettings};
use anyhow::{anyhow, Context, Result};
use parking_lot::{Condvar, Mutex};
use std::io::BufRead;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info};

/// Hands state updates from the event loop thread to the prompt thread
#[derive(Default)]
struct StateHandoff {
    /// Set by the callback, cleared by the prompt
    pending: Mutex<bool>,
    cv: Condvar,
}

/// State shared between the prompt loop and the device callback
#[derive(Clone)]
pub struct CliShared {
    console: Console,
    handoff: Arc<StateHandoff>,
}

impl CliShared {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            handoff: Arc::new(StateHandoff::default()),
        }
    }

    /// Callback to hand to the switch constructor
    pub fn state_callback(&self) -> StateCallback {
        let shared = self.clone();
        Box::new(move |state| shared.state_update_print(&state))
    }

    /// Print a state report and wake the prompt
    pub fn state_update_print(&self, state: &DeviceState) {
        let mut pending = self.handoff.pending.lock();
        if let Some(line) = format_error(state) {
            self.console.print(&line);
        }
        self.console.print(&format_state(state));
        *pending = true;
        self.handoff.cv.notify_one();
    }

    /// Wait up to `timeout` for a state report, then print the menu.
    /// Returns whether a report arrived
    fn wait_and_display_menu(&self, timeout: Duration) -> bool {
        let mut pending = self.handoff.pending.lock();
        let result = self
            .handoff
            .cv
            .wait_while_for(&mut pending, |pending| !*pending, timeout);
        if result.timed_out() {
            debug!("Wait for state update timed out");
        }
        let updated = *pending;
        *pending = false;
        self.console.print(&menu_text());
        updated
    }
}

/// Prompt loop settings
#[derive(Debug, Clone)]
pub struct CliOptions {
    pub prompt_timeout: Duration,
    /// Interface for DPP bootstrapping
    pub so_iface: Option<String>,
    pub dpp: DppSettings,
}

impl Default for CliOptions {
    fn default() -> Self {
        Self {
            prompt_timeout: Duration::from_secs(1),
            so_iface: None,
            dpp: DppSettings::default(),
        }
    }
}

/// Interactive menu driving a light switch
pub struct SwitchCli<S: LightSwitch + 'static> {
    switch: Arc<S>,
    shared: CliShared,
    options: CliOptions,
    quit: AtomicBool,
}

impl<S: LightSwitch + 'static> SwitchCli<S> {
    pub fn new(switch: Arc<S>, shared: CliShared, options: CliOptions) -> Self {
        Self {
            switch,
            shared,
            options,
            quit: AtomicBool::new(false),
        }
    }

    /// Run the switch event loop in the background and the prompt in the
    /// foreground until exit is chosen or `input` ends. The event loop thread
    /// is always stopped and joined before returning
    pub fn run(&self, input: impl BufRead) -> Result<()> {
        let runner = Arc::clone(&self.switch);
        let event_thread = thread::Builder::new()
            .name("switch-event-loop".to_string())
            .spawn(move || {
                if let Err(e) = runner.main_event_loop() {
                    error!("Switch event loop failed: {}", e);
                }
            })
            .context("Failed to spawn switch event loop thread")?;

        let result = self.prompt_loop(input);

        info!("Stopping switch event loop");
        self.switch.stop_main_loop();
        event_thread
            .join()
            .map_err(|_| anyhow!("Switch event loop thread panicked"))?;

        result
    }

    /// Whether exit has been requested
    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::SeqCst)
    }

    fn prompt_loop(&self, mut input: impl BufRead) -> Result<()> {
        let mut line = Vec::new();

        while !self.quit_requested() {
            self.shared.wait_and_display_menu(self.options.prompt_timeout);

            let selection = loop {
                self.shared.console.prompt("Choose an option: ");
                line.clear();
                let read = input
                    .read_until(b'\n', &mut line)
                    .context("Failed to read input")?;
                if read == 0 {
                    break None;
                }
                // Bytes that are not UTF-8 fail to parse like any other junk
                match parse_selection(&String::from_utf8_lossy(&line)) {
                    Ok(number) => break Some(number),
                    Err(message) => self.shared.console.print(&message),
                }
            };

            match selection {
                Some(number) => self.process_selection(number),
                None => {
                    debug!("Input closed");
                    self.quit.store(true, Ordering::SeqCst);
                }
            }
        }

        Ok(())
    }

    fn process_selection(&self, number: i64) {
        match MenuSelection::from_number(number) {
            Some(MenuSelection::DiscoverLight) => {
                if let Err(e) = self.switch.discover_light() {
                    error!("Discover failed: {}", e);
                }
            }
            Some(MenuSelection::ToggleLight) => {
                if let Err(e) = self.switch.toggle_light() {
                    error!("Toggle failed: {}", e);
                }
            }
            Some(MenuSelection::DisplayDppUri) => self.print_dpp_uri(),
            Some(MenuSelection::Exit) => {
                debug!("Exit called");
                self.quit.store(true, Ordering::SeqCst);
            }
            None => debug!("Ignoring unknown option {}", number),
        }
    }

    fn print_dpp_uri(&self) {
        match self.fetch_dpp_uri() {
            Ok(uri) => self.shared.console.print(&format!("\nDPP URI: {}\n", uri)),
            Err(e) => error!("Failed to fetch/generate DPP URI: {:#}", e),
        }
    }

    fn fetch_dpp_uri(&self) -> Result<String> {
        let iface = self
            .options
            .so_iface
            .as_deref()
            .ok_or(EnvError::Missing(SO_IFACE))?;
        let uri = get_dpp_uri(iface, &self.options.dpp)?;
        let listen_output = start_dpp_listen(iface, &self.options.dpp)?;
        debug!("DPP listen init output: {}", listen_output);
        Ok(uri)
    }
}

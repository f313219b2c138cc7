//! Generic device touchscreen UI
//!
//! Holds everything the lamp screen shares with other device screens: the
//! button panel, the output log, the device image and the DPP QR overlay.
//! Device-specific behavior plugs in through [`DeviceController`].

use crate::core::events::{AppEvent, EventSender};
use crate::core::state::DeviceState;
use crate::wpa::{get_dpp_uri, start_dpp_listen, DppSettings};
use chrono::{DateTime, Local};
use std::collections::VecDeque;
use std::thread;
use tracing::{debug, error, info};

/// Lines kept in the output log
const MAX_OUTPUT_LINES: usize = 200;

/// On-screen buttons
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiButton {
    Discover,
    Toggle,
    QrCode,
}

impl UiButton {
    pub const ALL: [UiButton; 3] = [UiButton::Discover, UiButton::Toggle, UiButton::QrCode];
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonState {
    pub text: String,
    pub enabled: bool,
}

impl ButtonState {
    fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            enabled: true,
        }
    }
}

/// Labels and enabled flags of the on-screen buttons
#[derive(Debug, Clone)]
pub struct ButtonPanel {
    discover: ButtonState,
    toggle: ButtonState,
    qr_code: ButtonState,
}

impl Default for ButtonPanel {
    fn default() -> Self {
        Self {
            discover: ButtonState::new("Discover"),
            toggle: ButtonState::new("Toggle Light"),
            qr_code: ButtonState::new("Show QR Code"),
        }
    }
}

impl ButtonPanel {
    pub fn get(&self, button: UiButton) -> &ButtonState {
        match button {
            UiButton::Discover => &self.discover,
            UiButton::Toggle => &self.toggle,
            UiButton::QrCode => &self.qr_code,
        }
    }

    fn get_mut(&mut self, button: UiButton) -> &mut ButtonState {
        match button {
            UiButton::Discover => &mut self.discover,
            UiButton::Toggle => &mut self.toggle,
            UiButton::QrCode => &mut self.qr_code,
        }
    }

    pub fn is_enabled(&self, button: UiButton) -> bool {
        self.get(button).enabled
    }

    pub fn set_enabled(&mut self, button: UiButton, enabled: bool) {
        self.get_mut(button).enabled = enabled;
    }

    pub fn set_text(&mut self, button: UiButton, text: &str) {
        self.get_mut(button).text = text.to_string();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputKind {
    Info,
    Error,
}

#[derive(Debug, Clone)]
pub struct OutputLine {
    pub timestamp: DateTime<Local>,
    pub kind: OutputKind,
    pub text: String,
}

/// Bounded scrollback shown under the device image
#[derive(Debug, Default)]
pub struct OutputLog {
    lines: VecDeque<OutputLine>,
}

impl OutputLog {
    pub fn push(&mut self, kind: OutputKind, text: impl Into<String>) {
        if self.lines.len() == MAX_OUTPUT_LINES {
            self.lines.pop_front();
        }
        self.lines.push_back(OutputLine {
            timestamp: Local::now(),
            kind,
            text: text.into(),
        });
    }

    pub fn lines(&self) -> impl Iterator<Item = &OutputLine> {
        self.lines.iter()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

/// Which device image is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeviceImage {
    #[default]
    Off,
    On,
}

/// State shared by every device screen
pub struct DeviceUi {
    iface_name: String,
    pub buttons: ButtonPanel,
    pub output: OutputLog,
    pub image: DeviceImage,
    qr_code_shown: bool,
    dpp_uri: Option<String>,
    dpp_pending: bool,
    dpp: DppSettings,
    events: EventSender,
}

impl DeviceUi {
    /// `events` carries bootstrap results back to the UI thread
    pub fn new(iface_name: impl Into<String>, dpp: DppSettings, events: EventSender) -> Self {
        Self {
            iface_name: iface_name.into(),
            buttons: ButtonPanel::default(),
            output: OutputLog::default(),
            image: DeviceImage::default(),
            qr_code_shown: false,
            dpp_uri: None,
            dpp_pending: false,
            dpp,
            events,
        }
    }

    /// Use an already generated bootstrap URI instead of asking wpa_supplicant
    pub fn with_dpp_uri(mut self, uri: impl Into<String>) -> Self {
        self.dpp_uri = Some(uri.into());
        self
    }

    pub fn iface_name(&self) -> &str {
        &self.iface_name
    }

    pub fn qr_code_shown(&self) -> bool {
        self.qr_code_shown
    }

    pub fn dpp_uri(&self) -> Option<&str> {
        self.dpp_uri.as_deref()
    }

    /// Whether a bootstrap is running on the helper thread
    pub fn dpp_pending(&self) -> bool {
        self.dpp_pending
    }

    /// Show or hide the DPP QR code.
    ///
    /// The first show generates the bootstrap URI and starts DPP listen on a
    /// helper thread, since wpa_supplicant may take up to its reply timeout
    /// per command. The result comes back as [`AppEvent::DppBootstrap`] and
    /// is applied by [`DeviceUi::finish_dpp_bootstrap`].
    pub fn toggle_qr_code(&mut self) {
        if self.qr_code_shown {
            debug!("Hiding QR code");
            self.qr_code_shown = false;
            return;
        }

        if self.dpp_uri.is_some() {
            debug!("Showing QR code");
            self.qr_code_shown = true;
            return;
        }

        if self.dpp_pending {
            debug!("DPP bootstrap already running");
            return;
        }

        let iface = self.iface_name.clone();
        let dpp = self.dpp.clone();
        let events = self.events.clone();
        let spawned = thread::Builder::new()
            .name("dpp-bootstrap".to_string())
            .spawn(move || {
                let result = bootstrap(&iface, &dpp).map_err(|e| format!("{:#}", e));
                if events.send(AppEvent::DppBootstrap(result)).is_err() {
                    debug!("UI closed, dropping DPP bootstrap result");
                }
            });

        match spawned {
            Ok(_) => self.dpp_pending = true,
            Err(e) => self.finish_dpp_bootstrap(Err(format!("failed to spawn thread: {}", e))),
        }
    }

    /// Apply a bootstrap result. Success shows the QR code; failure is
    /// logged to the output and the overlay stays hidden
    pub fn finish_dpp_bootstrap(&mut self, result: Result<String, String>) {
        self.dpp_pending = false;
        match result {
            Ok(uri) => {
                info!("DPP bootstrap ready on {}", self.iface_name);
                self.dpp_uri = Some(uri);
                self.qr_code_shown = true;
            }
            Err(e) => {
                error!("Failed to fetch/generate DPP URI: {}", e);
                self.append_output_text(OutputKind::Error, format!("DPP setup failed: {}", e));
            }
        }
    }

    pub fn append_output_text(&mut self, kind: OutputKind, text: impl Into<String>) {
        self.output.push(kind, text);
    }

    /// Default button wiring, before the device screen customizes it
    pub fn reset_buttons(&mut self) {
        self.buttons = ButtonPanel::default();
    }
}

fn bootstrap(iface: &str, dpp: &DppSettings) -> anyhow::Result<String> {
    let uri = get_dpp_uri(iface, dpp)?;
    let listen_output = start_dpp_listen(iface, dpp)?;
    debug!("DPP listen init output: {}", listen_output);
    Ok(uri)
}

/// Device-specific half of a touchscreen UI
pub trait DeviceController {
    fn ui(&self) -> &DeviceUi;
    fn ui_mut(&mut self) -> &mut DeviceUi;

    /// Enable/disable buttons for this device
    fn set_buttons(&mut self) {
        self.ui_mut().reset_buttons();
    }

    /// Apply device-specific button labels
    fn retranslate_ui(&mut self) {}

    /// Toggle button action
    fn toggle_switch(&mut self);

    /// Discover button action
    fn discover(&mut self) {}

    /// Render a state report from the device
    fn state_update_ui(&mut self, state: &DeviceState);

    /// Start the device event loop
    fn start(&mut self) -> anyhow::Result<()>;

    /// Stop the device event loop
    fn stop(&mut self);

    /// Handle a button press. Disabled buttons do nothing; returns whether
    /// the press was handled
    fn press(&mut self, button: UiButton) -> bool {
        if !self.ui().buttons.is_enabled(button) {
            debug!("{:?} button is disabled", button);
            return false;
        }
        match button {
            UiButton::Discover => self.discover(),
            UiButton::Toggle => self.toggle_switch(),
            UiButton::QrCode => self.ui_mut().toggle_qr_code(),
        }
        true
    }
}

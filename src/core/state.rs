//! Observed device state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot reported by the device layer on every state change
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeviceState {
    /// Whether the light has been discovered on the network
    pub discovered: bool,
    /// Light on/off. Only meaningful while `discovered` is set
    pub state: bool,
    /// Whether the OCF stack reported an error
    pub error_state: bool,
    /// Raw error text from the OCF stack (ASCII)
    pub error_message: Vec<u8>,
}

impl DeviceState {
    /// Create a state without error information
    pub fn new(discovered: bool, state: bool) -> Self {
        Self {
            discovered,
            state,
            error_state: false,
            error_message: Vec::new(),
        }
    }

    /// Create an error report, keeping the last known discovery/light state
    pub fn error(discovered: bool, state: bool, message: impl Into<Vec<u8>>) -> Self {
        Self {
            discovered,
            state,
            error_state: true,
            error_message: message.into(),
        }
    }

    /// Light state, or `None` while the light is undiscovered
    pub fn light_state(&self) -> Option<bool> {
        self.discovered.then_some(self.state)
    }

    /// Light state for display, `N/A` while the light is undiscovered
    pub fn light_state_label(&self) -> String {
        match self.light_state() {
            Some(on) => on.to_string(),
            None => "N/A".to_string(),
        }
    }

    /// Decode the error message. Non-ASCII bytes become replacement characters
    pub fn decoded_error(&self) -> String {
        self.error_message
            .iter()
            .map(|&b| if b.is_ascii() { b as char } else { char::REPLACEMENT_CHARACTER })
            .collect::<String>()
            .trim_end_matches('\0')
            .to_string()
    }
}

impl fmt::Display for DeviceState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "discovered {}, state {} error_state {} error_message {:?}",
            self.discovered,
            self.state,
            self.error_state,
            self.decoded_error()
        )
    }
}

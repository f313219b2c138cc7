//! Switch menu entries and console formatting

use crate::core::state::DeviceState;

/// Numbered menu entries
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuSelection {
    DiscoverLight,
    ToggleLight,
    DisplayDppUri,
    Exit,
}

impl MenuSelection {
    pub const ALL: [MenuSelection; 4] = [
        MenuSelection::DiscoverLight,
        MenuSelection::ToggleLight,
        MenuSelection::DisplayDppUri,
        MenuSelection::Exit,
    ];

    pub fn number(self) -> i64 {
        match self {
            MenuSelection::DiscoverLight => 1,
            MenuSelection::ToggleLight => 2,
            MenuSelection::DisplayDppUri => 3,
            MenuSelection::Exit => 9,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            MenuSelection::DiscoverLight => "Discover Light",
            MenuSelection::ToggleLight => "Toggle Light State",
            MenuSelection::DisplayDppUri => "Display DPP URI",
            MenuSelection::Exit => "Exit",
        }
    }

    /// Unknown numbers map to `None` and are ignored by the CLI
    pub fn from_number(number: i64) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.number() == number)
    }
}

/// The menu block printed before every prompt
pub fn menu_text() -> String {
    let mut text = String::from("\n");
    for selection in MenuSelection::ALL {
        text.push_str(&format!("{}: {}\n", selection.number(), selection.label()));
    }
    text
}

/// Parse one line of prompt input
pub fn parse_selection(line: &str) -> Result<i64, String> {
    let trimmed = line.trim();
    trimmed
        .parse()
        .map_err(|_| format!("Error: '{}' is not a valid integer.", trimmed))
}

/// Light state block printed by the state callback
pub fn format_state(state: &DeviceState) -> String {
    format!(
        "\nCurrent light state:\nLight discovered: {}\nLight state: {}",
        state.discovered,
        state.light_state_label()
    )
}

/// Error line printed before the state block when the stack reports an error
pub fn format_error(state: &DeviceState) -> Option<String> {
    state
        .error_state
        .then(|| format!("IoTivity-Lite Error: {}", state.decoded_error()))
}

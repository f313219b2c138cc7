//! Configuration management

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Switch CLI configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CliConfig {
    /// How long the prompt waits for a state update before redrawing the menu
    #[serde(default = "default_prompt_timeout")]
    pub prompt_timeout_ms: u64,
}

fn default_prompt_timeout() -> u64 {
    1000
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            prompt_timeout_ms: default_prompt_timeout(),
        }
    }
}

/// wpa_supplicant control interface configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WpaConfig {
    /// Directory holding the per-interface control sockets
    #[serde(default = "default_ctrl_dir")]
    pub ctrl_dir: PathBuf,
    /// Reply timeout in milliseconds
    #[serde(default = "default_reply_timeout")]
    pub reply_timeout_ms: u64,
    /// Operating class/channel advertised in the bootstrap URI
    #[serde(default = "default_bootstrap_channel")]
    pub bootstrap_channel: String,
    /// Frequency in MHz used for DPP listen
    #[serde(default = "default_listen_freq")]
    pub listen_freq: u32,
}

fn default_ctrl_dir() -> PathBuf {
    PathBuf::from("/var/run/wpa_supplicant")
}
fn default_reply_timeout() -> u64 {
    3000
}
fn default_bootstrap_channel() -> String {
    "81/6".to_string()
}
fn default_listen_freq() -> u32 {
    2437
}

impl Default for WpaConfig {
    fn default() -> Self {
        Self {
            ctrl_dir: default_ctrl_dir(),
            reply_timeout_ms: default_reply_timeout(),
            bootstrap_channel: default_bootstrap_channel(),
            listen_freq: default_listen_freq(),
        }
    }
}

/// Physical button configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GpioConfig {
    /// GPIO character device
    #[serde(default = "default_chip")]
    pub chip: PathBuf,
    /// Button toggling the DPP QR code overlay
    #[serde(default = "default_qr_pin")]
    pub qr_pin: u32,
    /// Button toggling the lamp
    #[serde(default = "default_lamp_pin")]
    pub lamp_pin: u32,
    /// Button closing the app (dev) or rebooting the host (prod)
    #[serde(default = "default_power_pin")]
    pub power_pin: u32,
    /// Presses closer together than this are dropped
    #[serde(default = "default_debounce")]
    pub debounce_ms: u64,
}

fn default_chip() -> PathBuf {
    PathBuf::from("/dev/gpiochip0")
}
fn default_qr_pin() -> u32 {
    17
}
fn default_lamp_pin() -> u32 {
    23
}
fn default_power_pin() -> u32 {
    27
}
fn default_debounce() -> u64 {
    300
}

impl Default for GpioConfig {
    fn default() -> Self {
        Self {
            chip: default_chip(),
            qr_pin: default_qr_pin(),
            lamp_pin: default_lamp_pin(),
            power_pin: default_power_pin(),
            debounce_ms: default_debounce(),
        }
    }
}

/// Lamp window configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Force fullscreen on or off. Unset follows `ENV` (fullscreen outside dev)
    #[serde(default)]
    pub fullscreen: Option<bool>,
    /// Window width in points when not fullscreen
    #[serde(default = "default_width")]
    pub width: f32,
    /// Window height in points when not fullscreen
    #[serde(default = "default_height")]
    pub height: f32,
}

fn default_width() -> f32 {
    800.0
}
fn default_height() -> f32 {
    480.0
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            fullscreen: None,
            width: default_width(),
            height: default_height(),
        }
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Switch CLI configuration
    #[serde(default)]
    pub cli: CliConfig,
    /// wpa_supplicant configuration
    #[serde(default)]
    pub wpa: WpaConfig,
    /// Physical button configuration
    #[serde(default)]
    pub gpio: GpioConfig,
    /// Lamp window configuration
    #[serde(default)]
    pub ui: UiConfig,
}

impl Config {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path()?;
        Self::load_from(&config_path)
    }

    /// Load configuration from a file, falling back to defaults if it does not exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            let content = std::fs::read_to_string(config_path)
                .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
            let config: Config = toml::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {:?}", config_path))?;
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    /// Get the configuration file path
    pub fn config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("org", "slined", "SlinedOnboarding")
            .context("Failed to determine config directory")?;
        Ok(proj_dirs.config_dir().join("config.toml"))
    }

    /// Get the default configuration embedded in the binary
    pub fn default_config_str() -> &'static str {
        include_str!("../../config/default.toml")
    }
}

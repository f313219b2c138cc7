//! Environment variables consumed by both front-ends

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

/// wpa_supplicant control interface the OCF device binds to
pub const WPA_CTRL_IFACE: &str = "WPA_CTRL_IFACE";
/// Interface used for DPP bootstrapping
pub const SO_IFACE: &str = "SO_IFACE";
/// Directory holding the device credentials
pub const SO_LIGHTSWITCH_CREDS: &str = "SO_LIGHTSWITCH_CREDS";
/// Whether the lamp keeps its credentials and state across restarts
pub const SO_PERSIST_CREDS: &str = "SO_PERSIST_CREDS";
/// Deployment mode, `dev` or anything else for production
pub const ENV: &str = "ENV";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum EnvError {
    #[error("{0} variable not set!")]
    Missing(&'static str),
}

/// Deployment mode selected by `ENV`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunMode {
    Dev,
    #[default]
    Prod,
}

impl RunMode {
    fn parse(value: Option<&str>) -> Self {
        match value {
            Some("dev") => RunMode::Dev,
            _ => RunMode::Prod,
        }
    }
}

/// Snapshot of the process environment
#[derive(Debug, Clone, Default)]
pub struct Env {
    pub wpa_ctrl_iface: Option<String>,
    pub so_iface: Option<String>,
    pub creds_dir: Option<PathBuf>,
    pub persist_creds: bool,
    pub mode: RunMode,
}

impl Env {
    /// Read from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read through an arbitrary lookup. Empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());
        Self {
            wpa_ctrl_iface: get(WPA_CTRL_IFACE),
            so_iface: get(SO_IFACE),
            creds_dir: get(SO_LIGHTSWITCH_CREDS).map(PathBuf::from),
            persist_creds: get(SO_PERSIST_CREDS).is_some_and(|v| parse_flag(&v)),
            mode: RunMode::parse(get(ENV).as_deref()),
        }
    }

    pub fn require_wpa_ctrl_iface(&self) -> Result<&str, EnvError> {
        self.wpa_ctrl_iface
            .as_deref()
            .ok_or(EnvError::Missing(WPA_CTRL_IFACE))
    }

    pub fn require_so_iface(&self) -> Result<&str, EnvError> {
        self.so_iface.as_deref().ok_or(EnvError::Missing(SO_IFACE))
    }
}

/// Load a `.env` file into the process environment. Variables already set win.
///
/// A missing file is not an error; returns the path that was loaded, if any.
pub fn load_dotenv(path: Option<&Path>) -> anyhow::Result<Option<PathBuf>> {
    let result = match path {
        Some(path) => dotenvy::from_path(path).map(|_| path.to_path_buf()),
        None => dotenvy::dotenv(),
    };
    match result {
        Ok(loaded) => {
            debug!("Loaded environment from {:?}", loaded);
            Ok(Some(loaded))
        }
        Err(e) if e.not_found() => {
            debug!("No .env file found");
            Ok(None)
        }
        Err(e) => Err(anyhow::Error::new(e).context("Failed to load .env file")),
    }
}

fn parse_flag(value: &str) -> bool {
    matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "1" | "true" | "yes" | "on"
    )
}

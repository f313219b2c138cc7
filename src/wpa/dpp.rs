//! DPP bootstrapping through wpa_supplicant

use super::ctrl::WpaCtrl;
use super::WpaError;
use crate::core::config::WpaConfig;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::info;

/// Where interface MAC addresses are published
const SYSFS_NET: &str = "/sys/class/net";

/// How to reach wpa_supplicant and what to advertise
#[derive(Debug, Clone)]
pub struct DppSettings {
    pub ctrl_dir: PathBuf,
    pub reply_timeout: Duration,
    pub bootstrap_channel: String,
    pub listen_freq: u32,
    pub sysfs_net: PathBuf,
}

impl From<&WpaConfig> for DppSettings {
    fn from(config: &WpaConfig) -> Self {
        Self {
            ctrl_dir: config.ctrl_dir.clone(),
            reply_timeout: Duration::from_millis(config.reply_timeout_ms),
            bootstrap_channel: config.bootstrap_channel.clone(),
            listen_freq: config.listen_freq,
            sysfs_net: PathBuf::from(SYSFS_NET),
        }
    }
}

impl Default for DppSettings {
    fn default() -> Self {
        Self::from(&WpaConfig::default())
    }
}

/// Generate a QR-code bootstrap entry for `iface` and return its `DPP:` URI
pub fn get_dpp_uri(iface: &str, settings: &DppSettings) -> Result<String, WpaError> {
    let mac = read_mac(&settings.sysfs_net, iface)?;
    let ctrl = WpaCtrl::open(&settings.ctrl_dir, iface, settings.reply_timeout)?;

    let gen_cmd = bootstrap_gen_command(&settings.bootstrap_channel, &mac);
    let id = parse_bootstrap_id(&ctrl.request(&gen_cmd)?)?;

    let uri = ctrl.request(&format!("DPP_BOOTSTRAP_GET_URI {}", id))?;
    if !uri.starts_with("DPP:") {
        return Err(WpaError::InvalidReply(uri));
    }

    info!("Generated DPP bootstrap {} for {}", id, iface);
    Ok(uri)
}

/// Put `iface` into DPP listen mode so a configurator can reach it.
/// Returns the supplicant's reply
pub fn start_dpp_listen(iface: &str, settings: &DppSettings) -> Result<String, WpaError> {
    let ctrl = WpaCtrl::open(&settings.ctrl_dir, iface, settings.reply_timeout)?;
    let reply = ctrl.request(&format!("DPP_LISTEN {}", settings.listen_freq))?;
    info!("DPP listen on {} at {} MHz", iface, settings.listen_freq);
    Ok(reply)
}

pub fn bootstrap_gen_command(channel: &str, mac: &str) -> String {
    format!("DPP_BOOTSTRAP_GEN type=qrcode chan={} mac={}", channel, mac)
}

/// `DPP_BOOTSTRAP_GEN` answers with the numeric id of the new entry
pub fn parse_bootstrap_id(reply: &str) -> Result<u32, WpaError> {
    reply
        .trim()
        .parse()
        .map_err(|_| WpaError::InvalidReply(reply.to_string()))
}

/// Read and validate `<sysfs_net>/<iface>/address`
pub fn read_mac(sysfs_net: &Path, iface: &str) -> Result<String, WpaError> {
    let path = sysfs_net.join(iface).join("address");
    let raw = std::fs::read_to_string(&path).map_err(|source| WpaError::Io {
        context: format!("read {:?}", path),
        source,
    })?;
    let mac = raw.trim().to_ascii_lowercase();

    let octets: Vec<&str> = mac.split(':').collect();
    let valid = octets.len() == 6
        && octets
            .iter()
            .all(|o| o.len() == 2 && o.chars().all(|c| c.is_ascii_hexdigit()));
    if !valid {
        return Err(WpaError::MacAddress(mac));
    }
    Ok(mac)
}

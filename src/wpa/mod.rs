//! WPA module - wpa_supplicant control interface and DPP bootstrapping

mod ctrl;
mod dpp;

use thiserror::Error;

pub use ctrl::{check_reply, WpaCtrl};
pub use dpp::{
    bootstrap_gen_command, get_dpp_uri, parse_bootstrap_id, read_mac, start_dpp_listen,
    DppSettings,
};

#[derive(Debug, Error)]
pub enum WpaError {
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no reply to {0}")]
    Timeout(String),
    #[error("{command} rejected: {reply}")]
    Rejected { command: String, reply: String },
    #[error("unexpected reply: {0}")]
    InvalidReply(String),
    #[error("invalid MAC address: {0}")]
    MacAddress(String),
}

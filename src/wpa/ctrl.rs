//! wpa_supplicant control socket client

use super::WpaError;
use std::os::unix::net::UnixDatagram;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;
use tracing::{debug, trace};

/// Largest reply wpa_supplicant sends in one datagram
const REPLY_BUFFER_SIZE: usize = 4096;

/// Distinguishes local sockets opened by the same process
static LOCAL_SOCKET_COUNTER: AtomicU32 = AtomicU32::new(0);

/// Request/response connection to one interface's control socket
pub struct WpaCtrl {
    socket: UnixDatagram,
    local_path: PathBuf,
}

impl WpaCtrl {
    /// Connect to `<ctrl_dir>/<iface>`
    pub fn open(ctrl_dir: &Path, iface: &str, timeout: Duration) -> Result<Self, WpaError> {
        Self::open_path(&ctrl_dir.join(iface), timeout)
    }

    /// Connect to a control socket by path
    pub fn open_path(ctrl_path: &Path, timeout: Duration) -> Result<Self, WpaError> {
        let local_path = std::env::temp_dir().join(format!(
            "slined_wpa_ctrl_{}-{}",
            std::process::id(),
            LOCAL_SOCKET_COUNTER.fetch_add(1, Ordering::Relaxed)
        ));
        // A stale socket from a crashed run would make bind fail
        let _ = std::fs::remove_file(&local_path);

        let socket = UnixDatagram::bind(&local_path).map_err(|source| WpaError::Io {
            context: format!("bind {:?}", local_path),
            source,
        })?;

        // From here on Drop cleans up the local socket file
        let ctrl = Self { socket, local_path };

        ctrl.socket
            .connect(ctrl_path)
            .map_err(|source| WpaError::Io {
                context: format!("connect {:?}", ctrl_path),
                source,
            })?;
        ctrl.socket
            .set_read_timeout(Some(timeout))
            .map_err(|source| WpaError::Io {
                context: "set read timeout".to_string(),
                source,
            })?;

        debug!("Connected to wpa_supplicant at {:?}", ctrl_path);
        Ok(ctrl)
    }

    /// Send a command and return the trimmed reply.
    ///
    /// Unsolicited event messages (`<level>...`) are skipped. `FAIL` and
    /// `UNKNOWN COMMAND` replies are returned as [`WpaError::Rejected`].
    pub fn request(&self, command: &str) -> Result<String, WpaError> {
        debug!("wpa_ctrl > {}", command);
        self.socket
            .send(command.as_bytes())
            .map_err(|source| WpaError::Io {
                context: format!("send {}", command),
                source,
            })?;

        let mut buffer = [0u8; REPLY_BUFFER_SIZE];
        loop {
            let n = match self.socket.recv(&mut buffer) {
                Ok(n) => n,
                Err(e)
                    if matches!(
                        e.kind(),
                        std::io::ErrorKind::WouldBlock | std::io::ErrorKind::TimedOut
                    ) =>
                {
                    return Err(WpaError::Timeout(command.to_string()));
                }
                Err(source) => {
                    return Err(WpaError::Io {
                        context: format!("receive reply to {}", command),
                        source,
                    })
                }
            };

            let reply = String::from_utf8_lossy(&buffer[..n]);
            if reply.starts_with('<') {
                trace!("wpa_ctrl event {}", reply.trim_end());
                continue;
            }

            let reply = reply.trim().to_string();
            debug!("wpa_ctrl < {}", reply);
            return check_reply(command, reply);
        }
    }
}

impl Drop for WpaCtrl {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.local_path);
    }
}

/// Map failure replies to errors
pub fn check_reply(command: &str, reply: String) -> Result<String, WpaError> {
    if reply == "FAIL" || reply.starts_with("FAIL-") || reply == "UNKNOWN COMMAND" {
        return Err(WpaError::Rejected {
            command: command.to_string(),
            reply,
        });
    }
    Ok(reply)
}

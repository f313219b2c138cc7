#![allow(dead_code)]

//! Helpers shared by the integration tests

use parking_lot::Mutex;
use std::io::Write;
use std::os::unix::net::UnixDatagram;
use std::path::Path;
use std::sync::Arc;
use std::thread::{self, JoinHandle};

pub const TEST_URI: &str = "DPP:C:81/6;M:dca632010203;K:MDkwEwYHKoZIzj0CAQYIKoZIzj0DAQcDIgADtest;;";

/// In-memory console output
#[derive(Clone, Default)]
pub struct Buffer(Arc<Mutex<Vec<u8>>>);

impl Write for Buffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.0.lock().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

impl Buffer {
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.0.lock()).into_owned()
    }
}

/// Write `/sys/class/net`-style MAC entry for `iface` under `root`
pub fn fake_sysfs(root: &Path, iface: &str) {
    std::fs::create_dir_all(root.join(iface)).unwrap();
    std::fs::write(root.join(iface).join("address"), "dc:a6:32:01:02:03\n").unwrap();
}

/// Minimal wpa_supplicant answering DPP commands on `<dir>/<iface>`.
/// Serves `requests` commands, then returns every command it saw
pub fn fake_supplicant(dir: &Path, iface: &str, requests: usize) -> JoinHandle<Vec<String>> {
    let socket = UnixDatagram::bind(dir.join(iface)).unwrap();
    thread::spawn(move || {
        let mut seen = Vec::new();
        let mut buffer = [0u8; 4096];
        for _ in 0..requests {
            let (n, peer) = socket.recv_from(&mut buffer).unwrap();
            let command = String::from_utf8_lossy(&buffer[..n]).into_owned();
            let peer = peer.as_pathname().unwrap().to_path_buf();

            let reply = if command.starts_with("DPP_BOOTSTRAP_GEN ") {
                // Unsolicited events may arrive before the reply
                socket.send_to(b"<3>CTRL-EVENT-SCAN-STARTED ", &peer).unwrap();
                "1\n".to_string()
            } else if command == "DPP_BOOTSTRAP_GET_URI 1" {
                TEST_URI.to_string()
            } else if command.starts_with("DPP_LISTEN ") {
                "OK\n".to_string()
            } else {
                "UNKNOWN COMMAND\n".to_string()
            };
            socket.send_to(reply.as_bytes(), &peer).unwrap();
            seen.push(command);
        }
        seen
    })
}

//! DPP bootstrapping against a fake wpa_supplicant

mod common;

use common::{fake_supplicant, fake_sysfs, TEST_URI};
use slined_onboarding::wpa::{get_dpp_uri, start_dpp_listen, DppSettings, WpaCtrl, WpaError};
use std::time::Duration;

fn settings(dir: &std::path::Path) -> DppSettings {
    DppSettings {
        ctrl_dir: dir.to_path_buf(),
        sysfs_net: dir.join("sys"),
        reply_timeout: Duration::from_secs(2),
        ..DppSettings::default()
    }
}

#[test]
fn test_get_dpp_uri_and_listen() {
    let dir = tempfile::tempdir().unwrap();
    fake_sysfs(&dir.path().join("sys"), "wlan0");
    let supplicant = fake_supplicant(dir.path(), "wlan0", 3);
    let settings = settings(dir.path());

    let uri = get_dpp_uri("wlan0", &settings).unwrap();
    assert_eq!(uri, TEST_URI);
    assert_eq!(start_dpp_listen("wlan0", &settings).unwrap(), "OK");

    let seen = supplicant.join().unwrap();
    assert_eq!(
        seen,
        vec![
            "DPP_BOOTSTRAP_GEN type=qrcode chan=81/6 mac=dc:a6:32:01:02:03".to_string(),
            "DPP_BOOTSTRAP_GET_URI 1".to_string(),
            "DPP_LISTEN 2437".to_string(),
        ]
    );
}

#[test]
fn test_rejected_command() {
    let dir = tempfile::tempdir().unwrap();
    let supplicant = fake_supplicant(dir.path(), "wlan0", 1);

    let ctrl = WpaCtrl::open(dir.path(), "wlan0", Duration::from_secs(2)).unwrap();
    let result = ctrl.request("DPP_PKEX_ADD");
    assert!(matches!(result, Err(WpaError::Rejected { .. })));
    supplicant.join().unwrap();
}

#[test]
fn test_request_timeout() {
    let dir = tempfile::tempdir().unwrap();
    // Bound but never answers
    let _silent = std::os::unix::net::UnixDatagram::bind(dir.path().join("wlan0")).unwrap();

    let ctrl = WpaCtrl::open(dir.path(), "wlan0", Duration::from_millis(50)).unwrap();
    assert!(matches!(ctrl.request("PING"), Err(WpaError::Timeout(_))));
}

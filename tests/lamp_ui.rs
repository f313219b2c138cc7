//! Lamp screen controller and worker against a recording lamp

mod common;

use common::{fake_supplicant, fake_sysfs, TEST_URI};
use slined_onboarding::core::events::{AppEvent, EventSender};
use slined_onboarding::device::{DeviceError, DeviceOptions, Lamp, OcfDevice, SimLamp};
use slined_onboarding::gpio::ButtonAction;
use slined_onboarding::gui::{
    DeviceApp, DeviceController, DeviceImage, DeviceUi, HostAction, LampUi, LampWorker,
    OutputKind, UiButton,
};
use slined_onboarding::wpa::DppSettings;
use slined_onboarding::DeviceState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Counts toggles; its event loop returns as soon as it is stopped
#[derive(Default)]
struct RecordingLamp {
    toggles: AtomicUsize,
    stops: AtomicUsize,
}

impl OcfDevice for RecordingLamp {
    fn main_event_loop(&self) -> Result<(), DeviceError> {
        while self.stops.load(Ordering::SeqCst) == 0 {
            std::thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    }

    fn stop_main_loop(&self) {
        self.stops.fetch_add(1, Ordering::SeqCst);
    }
}

impl Lamp for RecordingLamp {
    fn toggle_lamp(&self) -> Result<(), DeviceError> {
        self.toggles.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn lamp_ui(device_ui: DeviceUi) -> (LampUi<RecordingLamp>, Arc<RecordingLamp>, EventSender) {
    let (sender, _events) = EventSender::channel();
    let lamp = Arc::new(RecordingLamp::default());
    let worker = LampWorker::new(Arc::clone(&lamp), sender.clone());
    (LampUi::new(device_ui, worker), lamp, sender)
}

fn plain_ui() -> DeviceUi {
    let (sender, _events) = EventSender::channel();
    DeviceUi::new("wlan0", DppSettings::default(), sender)
}

#[test]
fn test_discover_button_is_disabled() {
    let (mut ui, lamp, _sender) = lamp_ui(plain_ui());

    assert!(!ui.ui().buttons.is_enabled(UiButton::Discover));
    assert!(!ui.press(UiButton::Discover));
    assert_eq!(lamp.toggles.load(Ordering::SeqCst), 0);
    assert!(ui.ui().output.is_empty());
}

#[test]
fn test_toggle_button_label_and_action() {
    let (mut ui, lamp, _sender) = lamp_ui(plain_ui());

    assert_eq!(ui.ui().buttons.get(UiButton::Toggle).text, "Toggle");
    assert!(ui.press(UiButton::Toggle));
    assert!(ui.press(UiButton::Toggle));
    assert_eq!(lamp.toggles.load(Ordering::SeqCst), 2);
}

#[test]
fn test_toggle_hides_qr_code() {
    let (mut ui, lamp, _sender) = lamp_ui(plain_ui().with_dpp_uri("DPP:K:abc;;"));

    assert!(ui.press(UiButton::QrCode));
    assert!(ui.ui().qr_code_shown());

    ui.toggle_switch();
    assert!(!ui.ui().qr_code_shown());
    assert_eq!(lamp.toggles.load(Ordering::SeqCst), 1);
}

#[test]
fn test_state_updates_swap_image_and_report_errors() {
    let (mut ui, _lamp, _sender) = lamp_ui(plain_ui());

    ui.state_update_ui(&DeviceState::new(true, true));
    assert_eq!(ui.ui().image, DeviceImage::On);

    ui.state_update_ui(&DeviceState::error(true, false, b"Observe failed".to_vec()));
    // Error reports leave the image alone
    assert_eq!(ui.ui().image, DeviceImage::On);
    let line = ui.ui().output.lines().last().unwrap();
    assert_eq!(line.kind, OutputKind::Error);
    assert_eq!(line.text, "Observe failed");

    ui.state_update_ui(&DeviceState::new(true, false));
    assert_eq!(ui.ui().image, DeviceImage::Off);
}

#[test]
fn test_worker_run_and_stop() {
    let (sender, mut events) = EventSender::channel();
    let lamp = Arc::new(RecordingLamp::default());
    let worker = LampWorker::new(Arc::clone(&lamp), sender);

    worker.run().unwrap();
    assert!(worker.is_running());
    worker.stop().unwrap();
    assert!(!worker.is_running());
    assert_eq!(events.try_recv().unwrap(), AppEvent::DeviceStopped);
}

#[test]
fn test_state_callback_reaches_app() {
    let (sender, events) = EventSender::channel();
    let lamp = Arc::new(
        SimLamp::new(
            DeviceOptions::new("wlan0"),
            LampWorker::<SimLamp>::state_callback(sender.clone()),
        )
        .unwrap(),
    );
    let worker = LampWorker::new(Arc::clone(&lamp), sender);
    let ui = LampUi::new(plain_ui(), worker);
    let mut app = DeviceApp::new(ui, events);

    app.controller_mut().start().unwrap();
    app.controller_mut().toggle_switch();
    app.controller_mut().stop();

    assert_eq!(app.drain_events(), None);
    assert_eq!(app.controller().ui().image, DeviceImage::On);
    let last = app.controller().ui().output.lines().last().unwrap();
    assert_eq!(last.text, "Device stopped");
}

#[test]
fn test_physical_buttons() {
    let (sender, events) = EventSender::channel();
    let lamp = Arc::new(RecordingLamp::default());
    let worker = LampWorker::new(Arc::clone(&lamp), sender);
    let ui = LampUi::new(plain_ui().with_dpp_uri("DPP:K:abc;;"), worker);
    let mut app = DeviceApp::new(ui, events);

    assert_eq!(app.handle_event(AppEvent::Button(ButtonAction::ToggleQrCode)), None);
    assert!(app.controller().ui().qr_code_shown());

    assert_eq!(app.handle_event(AppEvent::Button(ButtonAction::ToggleLamp)), None);
    assert_eq!(lamp.toggles.load(Ordering::SeqCst), 1);
    assert!(!app.controller().ui().qr_code_shown());

    assert_eq!(
        app.handle_event(AppEvent::Button(ButtonAction::CloseWindow)),
        Some(HostAction::Close)
    );
    assert_eq!(
        app.handle_event(AppEvent::Button(ButtonAction::Reboot)),
        Some(HostAction::Reboot)
    );
}

#[test]
fn test_qr_code_bootstrap_runs_off_the_ui_thread() {
    let dir = tempfile::tempdir().unwrap();
    fake_sysfs(&dir.path().join("sys"), "wlan0");
    let supplicant = fake_supplicant(dir.path(), "wlan0", 3);
    let dpp = DppSettings {
        ctrl_dir: dir.path().to_path_buf(),
        sysfs_net: dir.path().join("sys"),
        reply_timeout: Duration::from_secs(2),
        ..DppSettings::default()
    };

    let (sender, events) = EventSender::channel();
    let worker = LampWorker::new(Arc::new(RecordingLamp::default()), sender.clone());
    let ui = LampUi::new(DeviceUi::new("wlan0", dpp, sender), worker);
    let mut app = DeviceApp::new(ui, events);

    assert!(app.controller_mut().press(UiButton::QrCode));
    // The press returns before wpa_supplicant has answered
    assert!(app.controller().ui().dpp_pending());
    assert!(!app.controller().ui().qr_code_shown());

    let deadline = std::time::Instant::now() + Duration::from_secs(5);
    while app.controller().ui().dpp_pending() && std::time::Instant::now() < deadline {
        app.drain_events();
        std::thread::sleep(Duration::from_millis(10));
    }

    assert!(app.controller().ui().qr_code_shown());
    assert_eq!(app.controller().ui().dpp_uri(), Some(TEST_URI));
    assert_eq!(supplicant.join().unwrap().len(), 3);

    // Later shows reuse the cached URI
    assert!(app.controller_mut().press(UiButton::QrCode));
    assert!(app.controller_mut().press(UiButton::QrCode));
    assert!(app.controller().ui().qr_code_shown());
    assert!(!app.controller().ui().dpp_pending());
}

//! Simulated switch and lamp for bench setups without the OCF stack
//!
//! Actions are queued on a channel and applied by `main_event_loop`, so state
//! callbacks always fire on the event loop thread like they do with the real
//! stack.

use super::{DeviceError, DeviceOptions, Lamp, LightSwitch, OcfDevice, StateCallback};
use crate::core::state::DeviceState;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// File the lamp keeps its state in when persistence is enabled
pub const LAMP_STATE_FILE: &str = "lamp_state.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    Discover,
    Toggle,
    Stop,
}

/// Command queue plus the callback, shared by both simulated devices
struct EventLoop {
    name: &'static str,
    tx: mpsc::UnboundedSender<Command>,
    rx: Mutex<Option<mpsc::UnboundedReceiver<Command>>>,
    callback: StateCallback,
}

impl EventLoop {
    fn new(name: &'static str, callback: StateCallback) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            name,
            tx,
            rx: Mutex::new(Some(rx)),
            callback,
        }
    }

    fn enqueue(&self, command: Command) -> Result<(), DeviceError> {
        debug!("{}: queue {:?}", self.name, command);
        self.tx.send(command).map_err(|_| DeviceError::LoopClosed)
    }

    fn report(&self, state: DeviceState) {
        debug!("{}: report {}", self.name, state);
        (self.callback)(state);
    }

    /// Block on the queue, handing every command to `handle`, until `Stop`
    fn run(&self, mut handle: impl FnMut(Command)) -> Result<(), DeviceError> {
        let mut rx = self.rx.lock().take().ok_or(DeviceError::LoopRunning)?;
        info!("{} event loop started", self.name);

        while let Some(command) = rx.blocking_recv() {
            if command == Command::Stop {
                break;
            }
            handle(command);
        }

        *self.rx.lock() = Some(rx);
        info!("{} event loop stopped", self.name);
        Ok(())
    }

    fn stop(&self) {
        if self.enqueue(Command::Stop).is_err() {
            warn!("{}: stop requested after queue closed", self.name);
        }
    }
}

fn prepare_creds_dir(creds_dir: Option<&Path>) -> Result<(), DeviceError> {
    if let Some(path) = creds_dir {
        std::fs::create_dir_all(path).map_err(|source| DeviceError::Creds {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Using credentials directory {:?}", path);
    }
    Ok(())
}

#[derive(Debug, Default)]
struct SwitchModel {
    discovered: bool,
    light_on: bool,
}

/// Simulated light switch client
pub struct SimSwitch {
    model: Mutex<SwitchModel>,
    event_loop: EventLoop,
}

impl SimSwitch {
    pub fn new(options: DeviceOptions, callback: StateCallback) -> Result<Self, DeviceError> {
        prepare_creds_dir(options.creds_dir.as_deref())?;
        info!("Simulated switch on {}", options.iface);
        Ok(Self {
            model: Mutex::new(SwitchModel::default()),
            event_loop: EventLoop::new("switch", callback),
        })
    }

    fn handle(&self, command: Command) {
        let state = {
            let mut model = self.model.lock();
            match command {
                Command::Discover => {
                    model.discovered = true;
                    DeviceState::new(true, model.light_on)
                }
                Command::Toggle if !model.discovered => {
                    DeviceState::error(false, false, b"Light not discovered".to_vec())
                }
                Command::Toggle => {
                    model.light_on = !model.light_on;
                    DeviceState::new(true, model.light_on)
                }
                Command::Stop => return,
            }
        };
        self.event_loop.report(state);
    }
}

impl OcfDevice for SimSwitch {
    fn main_event_loop(&self) -> Result<(), DeviceError> {
        self.event_loop.report({
            let model = self.model.lock();
            DeviceState::new(model.discovered, model.light_on)
        });
        self.event_loop.run(|command| self.handle(command))
    }

    fn stop_main_loop(&self) {
        self.event_loop.stop();
    }
}

impl LightSwitch for SimSwitch {
    fn discover_light(&self) -> Result<(), DeviceError> {
        self.event_loop.enqueue(Command::Discover)
    }

    fn toggle_light(&self) -> Result<(), DeviceError> {
        self.event_loop.enqueue(Command::Toggle)
    }
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PersistedLamp {
    on: bool,
}

/// Simulated lamp server
pub struct SimLamp {
    on: Mutex<bool>,
    state_file: Option<PathBuf>,
    event_loop: EventLoop,
}

impl SimLamp {
    pub fn new(options: DeviceOptions, callback: StateCallback) -> Result<Self, DeviceError> {
        prepare_creds_dir(options.creds_dir.as_deref())?;

        let state_file = options
            .creds_dir
            .filter(|_| options.persist_creds)
            .map(|dir| dir.join(LAMP_STATE_FILE));

        let on = match &state_file {
            Some(path) => load_lamp(path)?,
            None => false,
        };

        info!(
            "Simulated lamp on {} (persist: {}, on: {})",
            options.iface,
            state_file.is_some(),
            on
        );

        Ok(Self {
            on: Mutex::new(on),
            state_file,
            event_loop: EventLoop::new("lamp", callback),
        })
    }

    pub fn is_on(&self) -> bool {
        *self.on.lock()
    }

    fn handle(&self, command: Command) {
        if command != Command::Toggle {
            return;
        }

        let on = {
            let mut on = self.on.lock();
            *on = !*on;
            *on
        };

        if let Some(path) = &self.state_file {
            if let Err(e) = save_lamp(path, on) {
                warn!("Failed to persist lamp state: {}", e);
                self.event_loop
                    .report(DeviceState::error(true, on, e.to_string().into_bytes()));
                return;
            }
        }

        self.event_loop.report(DeviceState::new(true, on));
    }
}

impl OcfDevice for SimLamp {
    fn main_event_loop(&self) -> Result<(), DeviceError> {
        self.event_loop.report(DeviceState::new(true, self.is_on()));
        self.event_loop.run(|command| self.handle(command))
    }

    fn stop_main_loop(&self) {
        self.event_loop.stop();
    }
}

impl Lamp for SimLamp {
    fn toggle_lamp(&self) -> Result<(), DeviceError> {
        self.event_loop.enqueue(Command::Toggle)
    }
}

fn load_lamp(path: &Path) -> Result<bool, DeviceError> {
    if !path.exists() {
        return Ok(false);
    }
    let content = std::fs::read_to_string(path).map_err(|source| DeviceError::Creds {
        path: path.to_path_buf(),
        source,
    })?;
    let persisted: PersistedLamp = serde_json::from_str(&content)?;
    Ok(persisted.on)
}

fn save_lamp(path: &Path, on: bool) -> Result<(), DeviceError> {
    let content = serde_json::to_string(&PersistedLamp { on })?;
    std::fs::write(path, content).map_err(|source| DeviceError::Creds {
        path: path.to_path_buf(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::thread;

    fn recorder() -> (StateCallback, Arc<Mutex<Vec<DeviceState>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        (Box::new(move |state| sink.lock().push(state)), seen)
    }

    #[test]
    fn test_switch_toggle_before_discovery_reports_error() {
        let (callback, seen) = recorder();
        let switch = SimSwitch::new(DeviceOptions::new("wlan0"), callback).unwrap();

        switch.toggle_light().unwrap();
        switch.discover_light().unwrap();
        switch.toggle_light().unwrap();
        switch.stop_main_loop();
        switch.main_event_loop().unwrap();

        let seen = seen.lock();
        assert_eq!(seen.len(), 4);
        assert_eq!(seen[0], DeviceState::new(false, false));
        assert!(seen[1].error_state);
        assert_eq!(seen[1].decoded_error(), "Light not discovered");
        assert_eq!(seen[2], DeviceState::new(true, false));
        assert_eq!(seen[3], DeviceState::new(true, true));
    }

    #[test]
    fn test_stop_from_other_thread() {
        let (callback, seen) = recorder();
        let switch = Arc::new(SimSwitch::new(DeviceOptions::new("wlan0"), callback).unwrap());

        let runner = Arc::clone(&switch);
        let handle = thread::spawn(move || runner.main_event_loop());
        switch.discover_light().unwrap();
        switch.stop_main_loop();

        handle.join().unwrap().unwrap();
        assert_eq!(seen.lock().last(), Some(&DeviceState::new(true, false)));
    }

    #[test]
    fn test_loop_can_restart() {
        let (callback, _seen) = recorder();
        let lamp = SimLamp::new(DeviceOptions::new("wlan0"), callback).unwrap();

        lamp.stop_main_loop();
        lamp.main_event_loop().unwrap();
        lamp.toggle_lamp().unwrap();
        lamp.stop_main_loop();
        lamp.main_event_loop().unwrap();
        assert!(lamp.is_on());
    }

    #[test]
    fn test_lamp_persists_state() {
        let dir = tempfile::tempdir().unwrap();
        let creds = dir.path().join("creds");
        let options = DeviceOptions::new("wlan0")
            .with_creds_dir(Some(creds.clone()))
            .with_persist_creds(true);

        let (callback, _seen) = recorder();
        let lamp = SimLamp::new(options.clone(), callback).unwrap();
        lamp.toggle_lamp().unwrap();
        lamp.stop_main_loop();
        lamp.main_event_loop().unwrap();
        assert!(creds.join(LAMP_STATE_FILE).exists());

        let (callback, seen) = recorder();
        let lamp = SimLamp::new(options, callback).unwrap();
        assert!(lamp.is_on());
        lamp.stop_main_loop();
        lamp.main_event_loop().unwrap();
        assert_eq!(seen.lock()[0], DeviceState::new(true, true));
    }

    #[test]
    fn test_lamp_without_persistence_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let options = DeviceOptions::new("wlan0").with_creds_dir(Some(dir.path().to_path_buf()));

        let (callback, _seen) = recorder();
        let lamp = SimLamp::new(options, callback).unwrap();
        lamp.toggle_lamp().unwrap();
        lamp.stop_main_loop();
        lamp.main_event_loop().unwrap();
        assert!(!dir.path().join(LAMP_STATE_FILE).exists());
    }

    #[test]
    fn test_lamp_rejects_corrupt_state() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(LAMP_STATE_FILE), "{not json").unwrap();
        let options = DeviceOptions::new("wlan0")
            .with_creds_dir(Some(dir.path().to_path_buf()))
            .with_persist_creds(true);

        let (callback, _seen) = recorder();
        assert!(matches!(
            SimLamp::new(options, callback),
            Err(DeviceError::Persist(_))
        ));
    }
}

//! Lamp GUI - Entry Point
//!
//! Touchscreen front-end for the lamp with three physical buttons: QR code
//! overlay, lamp toggle, and close (dev) or reboot (prod).

use anyhow::{anyhow, Context, Result};
use clap::Parser;
use slined_onboarding::{
    core::{env::load_dotenv, events::EventSender, logging},
    device::{DeviceOptions, SimLamp},
    gpio::{button_bindings, watch_buttons},
    gui::{DeviceApp, DeviceController, DeviceUi, LampUi, LampWorker},
    wpa::DppSettings,
    Config, Env, RunMode,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

#[derive(Parser)]
#[command(name = "lamp-gui", about = "Lamp onboarding touchscreen UI")]
struct Args {
    /// Environment file to load instead of ./.env
    #[arg(long)]
    env_file: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long)]
    config: Option<PathBuf>,
}

fn main() {
    let args = Args::parse();
    logging::init("debug");

    debug!("Current directory is {:?}", std::env::current_dir().ok());
    debug!("Loading environment vars from .env");
    if let Err(e) = load_dotenv(args.env_file.as_deref()) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    let env = Env::from_env();
    let iface_name = match env.require_so_iface() {
        Ok(iface) => iface.to_string(),
        Err(_) => {
            error!("Environment variable SO_IFACE not set - check configuration file.");
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&args, &env, iface_name) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, env: &Env, iface_name: String) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };

    let (sender, events) = EventSender::channel();

    let wpa_ctrl_iface = env.wpa_ctrl_iface.clone().unwrap_or_else(|| {
        warn!("WPA_CTRL_IFACE not set, using {}", iface_name);
        iface_name.clone()
    });
    let options = DeviceOptions::new(wpa_ctrl_iface)
        .with_creds_dir(env.creds_dir.clone())
        .with_persist_creds(env.persist_creds);
    let lamp = SimLamp::new(options, LampWorker::<SimLamp>::state_callback(sender.clone()))
        .context("Failed to create lamp")?;

    let worker = LampWorker::new(Arc::new(lamp), sender.clone());
    let device_ui = DeviceUi::new(iface_name, DppSettings::from(&config.wpa), sender.clone());
    let mut lamp_ui = LampUi::new(device_ui, worker);

    let bindings = button_bindings(&config.gpio, env.mode);
    let _buttons = match watch_buttons(&config.gpio, &bindings, sender.clone()) {
        Ok(watcher) => Some(watcher),
        Err(e) => {
            warn!("Physical buttons unavailable: {}", e);
            None
        }
    };

    let fullscreen = config.ui.fullscreen.unwrap_or(env.mode == RunMode::Prod);
    let mut viewport = egui::ViewportBuilder::default()
        .with_title("Lamp")
        .with_inner_size([config.ui.width, config.ui.height]);
    if fullscreen {
        viewport = viewport.with_fullscreen(true);
    }
    let native_options = eframe::NativeOptions {
        viewport,
        ..Default::default()
    };

    debug!("Starting the GUI");
    eframe::run_native(
        "Lamp",
        native_options,
        Box::new(move |cc| {
            sender.attach(cc.egui_ctx.clone());
            egui_extras::install_image_loaders(&cc.egui_ctx);
            lamp_ui.start()?;
            Ok(Box::new(DeviceApp::new(lamp_ui, events)))
        }),
    )
    .map_err(|e| anyhow!("GUI failed: {}", e))?;

    info!("Lamp GUI exited");
    Ok(())
}

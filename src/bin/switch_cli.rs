//! Switch CLI - Entry Point
//!
//! Runs the light switch event loop in the background and a numbered menu in
//! the foreground.

use anyhow::{Context, Result};
use clap::Parser;
use slined_onboarding::{
    cli::{CliOptions, CliShared, Console, SwitchCli},
    core::{env::load_dotenv, logging},
    device::{DeviceOptions, SimSwitch},
    wpa::DppSettings,
    Config, Env,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info};

#[derive(Parser)]
#[command(name = "switch-cli", about = "Light switch onboarding CLI")]
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
    logging::init("info");

    if let Err(e) = load_dotenv(args.env_file.as_deref()) {
        error!("{:#}", e);
        std::process::exit(1);
    }

    let env = Env::from_env();
    let wpa_ctrl_iface = match env.require_wpa_ctrl_iface() {
        Ok(iface) => iface.to_string(),
        Err(e) => {
            error!("{}", e);
            std::process::exit(-1);
        }
    };

    if let Err(e) = run(&args, &env, wpa_ctrl_iface) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn run(args: &Args, env: &Env, wpa_ctrl_iface: String) -> Result<()> {
    let config = match &args.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    info!("Configuration loaded");

    let shared = CliShared::new(Console::stdout());
    let options = DeviceOptions::new(wpa_ctrl_iface).with_creds_dir(env.creds_dir.clone());
    let switch = SimSwitch::new(options, shared.state_callback())
        .context("Failed to create light switch")?;

    let cli = SwitchCli::new(
        Arc::new(switch),
        shared,
        CliOptions {
            prompt_timeout: Duration::from_millis(config.cli.prompt_timeout_ms),
            so_iface: env.so_iface.clone(),
            dpp: DppSettings::from(&config.wpa),
        },
    );

    cli.run(std::io::stdin().lock())?;
    info!("Switch CLI exited");
    Ok(())
}

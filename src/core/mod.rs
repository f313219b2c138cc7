//! Core module - Configuration, environment, events and observed device state

pub mod config;
pub mod env;
pub mod events;
pub mod logging;
pub mod state;

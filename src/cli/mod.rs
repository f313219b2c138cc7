//! CLI module - line-menu front-end for the light switch

mod console;
pub mod menu;
mod runner;

pub use console::Console;
pub use menu::MenuSelection;
pub use runner::{CliOptions, CliShared, SwitchCli};

//! CLI layer: argument parsing, script replay and command dispatch

pub mod args;
pub mod commands;
pub mod error;
pub mod output;
pub mod script;

pub use args::{Cli, Commands, ConfigCommands};
pub use error::{CliError, CliResult};
pub use script::{Operation, Script};

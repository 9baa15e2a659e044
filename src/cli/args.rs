//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueHint};

use crate::config::OutputFormat;

/// Replay operation scripts against a level-indexed tree and print the result
#[derive(Parser, Debug)]
#[command(name = "silmaril")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Turn debugging information on (repeat for more: -d -d -d)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub debug: u8,

    /// Config file layered over the global one
    #[arg(short, long, global = true, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Apply a TOML operation script and print the resulting structure
    Run {
        /// Script file with [[op]] tables
        #[arg(value_hint = ValueHint::FilePath)]
        script: PathBuf,
        /// Output layout (overrides config)
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,
        /// Label nodes with (depth:index)
        #[arg(short = 'i', long)]
        show_index: bool,
        /// Abort at the first step whose target does not exist
        #[arg(short, long)]
        strict: bool,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show global config file location
    Path,
}

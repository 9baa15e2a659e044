//! Command dispatch

use std::io;
use std::path::Path;

use clap::CommandFactory;
use clap_complete::generate;
use tracing::{debug, instrument};

use crate::cli::args::{Cli, Commands, ConfigCommands};
use crate::cli::error::{CliError, CliResult};
use crate::cli::output;
use crate::cli::script::Script;
use crate::config::{self, OutputFormat, Settings};
use crate::domain::Silmaril;
use crate::tree_traits::{render_levels, TreeNodeConvert};

pub fn execute_command(cli: &Cli) -> CliResult<()> {
    match &cli.command {
        Some(Commands::Run {
            script,
            format,
            show_index,
            strict,
        }) => {
            let mut settings = Settings::load(cli.config.as_deref())?;
            if let Some(format) = format {
                settings.output.format = *format;
            }
            settings.output.show_index |= *show_index;
            settings.strict |= *strict;
            _run(script, &settings)
        }
        Some(Commands::Config { command }) => match command {
            ConfigCommands::Show => _config_show(cli.config.as_deref()),
            ConfigCommands::Path => _config_path(),
        },
        Some(Commands::Completion { shell }) => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(*shell, &mut cmd, name, &mut io::stdout());
            Ok(())
        }
        None => Err(CliError::InvalidArgs(
            "no command given, see --help".to_string(),
        )),
    }
}

/// Replays `script` on an empty structure and renders the result.
#[instrument]
pub fn run_script(script: &Path, settings: &Settings) -> CliResult<(Silmaril<String>, usize)> {
    let script = Script::load(script)?;
    let mut silmaril = Silmaril::new();
    let skipped = script.run(&mut silmaril, settings.strict)?;
    silmaril.check_invariants()?;
    debug!(nodes = silmaril.len(), skipped, "Script applied");
    Ok((silmaril, skipped))
}

/// Renders `silmaril` the way `settings` asks for.
pub fn render(silmaril: &Silmaril<String>, settings: &Settings) -> String {
    match settings.output.format {
        OutputFormat::Tree => silmaril
            .to_tree_string(settings.output.show_index)
            .to_string()
            .trim_end()
            .to_string(),
        OutputFormat::Levels => render_levels(silmaril, settings.output.show_index),
    }
}

#[instrument(skip(settings))]
fn _run(script: &Path, settings: &Settings) -> CliResult<()> {
    let (silmaril, skipped) = run_script(script, settings)?;
    output::info(&render(&silmaril, settings));
    if skipped > 0 {
        output::warning(&format!("{} step(s) skipped, target not found", skipped));
    } else {
        debug!("All steps applied");
    }
    Ok(())
}

fn _config_show(local: Option<&Path>) -> CliResult<()> {
    let settings = Settings::load(local)?;
    output::header("Effective settings");
    output::info(&settings.to_toml()?);
    Ok(())
}

fn _config_path() -> CliResult<()> {
    match config::global_config_path() {
        Some(path) if path.exists() => output::success(&path.display()),
        Some(path) => output::info(&format!("{} (not present)", path.display())),
        None => output::warning("no home directory, global config disabled"),
    }
    Ok(())
}

//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/silmaril/silmaril.toml`
//! 3. Local config: file passed with `--config`
//! 4. Environment variables: `SILMARIL_*` prefix, `__` separates nested keys

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use clap::ValueEnum;
use config::{Config, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::cli::error::{CliError, CliResult};

/// How `silmaril run` prints the final structure.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Indented parent/child tree
    #[default]
    Tree,
    /// One line per depth
    Levels,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tree => write!(f, "tree"),
            OutputFormat::Levels => write!(f, "levels"),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = CliError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "tree" => Ok(OutputFormat::Tree),
            "levels" => Ok(OutputFormat::Levels),
            other => Err(CliError::Config {
                message: format!("unknown output format '{other}' (expected tree or levels)"),
            }),
        }
    }
}

/// Rendering settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    /// Label nodes with their `(depth:index)` coordinate
    pub show_index: bool,
}

/// Unified configuration for silmaril.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Abort a script at the first step that cannot find its target
    pub strict: bool,
    pub output: OutputConfig,
}

/// Raw output settings for intermediate parsing (`None` = not specified).
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawOutputConfig {
    pub format: Option<OutputFormat>,
    pub show_index: Option<bool>,
}

/// Raw settings for intermediate parsing.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub strict: Option<bool>,
    pub output: RawOutputConfig,
}

/// Get the XDG config directory for silmaril.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "silmaril").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("silmaril.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> CliResult<RawSettings> {
    let content = std::fs::read_to_string(path).map_err(|e| CliError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| CliError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: config::ConfigError) -> CliError {
    CliError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Overlay wins wherever it specifies a value.
    pub fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            strict: overlay.strict.unwrap_or(self.strict),
            output: OutputConfig {
                format: overlay.output.format.unwrap_or(self.output.format),
                show_index: overlay.output.show_index.unwrap_or(self.output.show_index),
            },
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Arguments
    /// * `local` - Optional config file given on the command line. Unlike the
    ///   global file it must exist.
    #[instrument(level = "debug")]
    pub fn load(local: Option<&Path>) -> CliResult<Self> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config
        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!(path = %global_path.display(), "Loading global config");
                current = current.merge_with(&load_raw_settings(&global_path)?);
            }
        }

        // 3. Explicit local config
        if let Some(local_path) = local {
            debug!(path = %local_path.display(), "Loading local config");
            current = current.merge_with(&load_raw_settings(local_path)?);
        }

        // 4. Environment variables
        Self::apply_env_overrides(current)
    }

    /// Apply SILMARIL_* environment variables as explicit overrides.
    fn apply_env_overrides(mut settings: Self) -> CliResult<Self> {
        // Use config crate just for env var parsing
        let config = Config::builder()
            .add_source(
                Environment::with_prefix("SILMARIL")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()
            .map_err(config_err)?;

        if let Ok(val) = config.get_bool("strict") {
            settings.strict = val;
        }
        if let Ok(val) = config.get_string("output.format") {
            settings.output.format = val.parse()?;
        }
        if let Ok(val) = config.get_bool("output.show_index") {
            settings.output.show_index = val;
        }

        Ok(settings)
    }

    /// Render settings as TOML, as `config show` prints them.
    pub fn to_toml(&self) -> CliResult<String> {
        toml::to_string_pretty(self).map_err(|e| CliError::Config {
            message: e.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert!(!settings.strict);
        assert_eq!(settings.output.format, OutputFormat::Tree);
        assert!(!settings.output.show_index);
    }

    #[test]
    fn test_merge_with_only_overrides_specified() {
        let base = Settings {
            strict: true,
            output: OutputConfig {
                format: OutputFormat::Levels,
                show_index: false,
            },
        };
        let overlay: RawSettings = toml::from_str("[output]\nshow_index = true\n").unwrap();
        let merged = base.merge_with(&overlay);
        assert!(merged.strict);
        assert_eq!(merged.output.format, OutputFormat::Levels);
        assert!(merged.output.show_index);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!(" Levels ".parse::<OutputFormat>().unwrap(), OutputFormat::Levels);
        assert!("sideways".parse::<OutputFormat>().is_err());
    }

    #[test]
    fn test_to_toml_round_trips_through_raw() {
        let settings = Settings {
            strict: true,
            output: OutputConfig {
                format: OutputFormat::Levels,
                show_index: true,
            },
        };
        let raw: RawSettings = toml::from_str(&settings.to_toml().unwrap()).unwrap();
        assert_eq!(Settings::default().merge_with(&raw), settings);
    }
}

//! CLI-level errors (wraps domain errors)

use std::path::PathBuf;

use thiserror::Error;

use crate::domain::SilmarilError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("step {step}: {source}")]
    Step {
        step: usize,
        #[source]
        source: SilmarilError,
    },

    #[error("{0}")]
    Domain(#[from] SilmarilError),

    #[error("config: {message}")]
    Config { message: String },

    #[error("invalid script {path}: {message}")]
    Script { path: PathBuf, message: String },

    #[error("cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid arguments: {0}")]
    InvalidArgs(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::InvalidArgs(_) => crate::exitcode::USAGE,
            CliError::Step { .. } | CliError::Domain(_) => crate::exitcode::SOFTWARE,
            CliError::Config { .. } => crate::exitcode::CONFIG,
            CliError::Script { .. } => crate::exitcode::DATAERR,
            CliError::Io { source, .. } if source.kind() == std::io::ErrorKind::NotFound => {
                crate::exitcode::NOINPUT
            }
            CliError::Io { .. } => crate::exitcode::IOERR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(CliError::InvalidArgs("x".into()), crate::exitcode::USAGE)]
    #[case(CliError::Config { message: "x".into() }, crate::exitcode::CONFIG)]
    #[case(
        CliError::Script { path: PathBuf::from("s.toml"), message: "x".into() },
        crate::exitcode::DATAERR
    )]
    #[case(
        CliError::Step { step: 1, source: SilmarilError::NotFound { depth: 1, index: 0 } },
        crate::exitcode::SOFTWARE
    )]
    #[case(
        CliError::Io {
            path: PathBuf::from("missing.toml"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        },
        crate::exitcode::NOINPUT
    )]
    fn test_exit_code(#[case] error: CliError, #[case] expected: i32) {
        assert_eq!(error.exit_code(), expected);
    }

    #[test]
    fn test_step_error_message() {
        let error = CliError::Step {
            step: 3,
            source: SilmarilError::NotFound { depth: 2, index: 5 },
        };
        assert_eq!(error.to_string(), "step 3: no node at depth 2, index 5");
    }
}

//! Operation scripts replayed by `silmaril run`
//!
//! A script is a TOML file with one `[[op]]` table per step:
//!
//! ```toml
//! [[op]]
//! kind = "add_nodes"
//! values = ["1", "2", "3"]
//!
//! [[op]]
//! kind = "add_node"
//! value = "4"
//! at = [1, 0]
//!
//! [[op]]
//! kind = "remove_nodes"
//! depth = 1
//! start = 0
//! end = 2
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use tracing::{debug, instrument, warn};

use crate::cli::error::{CliError, CliResult};
use crate::domain::{Silmaril, SilmarilResult};

/// `(depth, index)` coordinate, written as `[depth, index]`.
pub type Coord = (usize, usize);

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Operation {
    AddNode {
        value: String,
        #[serde(default)]
        at: Option<Coord>,
    },
    AddNodes {
        values: Vec<String>,
        #[serde(default)]
        at: Option<Coord>,
    },
    RemoveNode {
        at: Coord,
    },
    RemoveNodes {
        depth: usize,
        start: usize,
        end: usize,
    },
    ClearLevel {
        depth: usize,
    },
    ReplaceNode {
        at: Coord,
        values: Vec<String>,
    },
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::AddNode { value, at } => write!(f, "add_node {value} at {at:?}"),
            Operation::AddNodes { values, at } => write!(f, "add_nodes {values:?} at {at:?}"),
            Operation::RemoveNode { at } => write!(f, "remove_node {at:?}"),
            Operation::RemoveNodes { depth, start, end } => {
                write!(f, "remove_nodes depth {depth} [{start}..{end})")
            }
            Operation::ClearLevel { depth } => write!(f, "clear_level {depth}"),
            Operation::ReplaceNode { at, values } => write!(f, "replace_node {at:?} with {values:?}"),
        }
    }
}

impl Operation {
    /// Applies this step. A failing step leaves `silmaril` unchanged.
    pub fn apply(&self, silmaril: &mut Silmaril<String>) -> SilmarilResult<()> {
        match self {
            Operation::AddNode { value, at } => {
                silmaril.add_node(value.clone(), *at);
            }
            Operation::AddNodes { values, at } => {
                silmaril.add_nodes(values.iter().cloned(), *at);
            }
            Operation::RemoveNode { at } => {
                silmaril.remove_node(at.0, at.1)?;
            }
            Operation::RemoveNodes { depth, start, end } => {
                silmaril.remove_nodes(*depth, *start, *end);
            }
            Operation::ClearLevel { depth } => {
                silmaril.clear_level(*depth);
            }
            Operation::ReplaceNode { at, values } => {
                silmaril.replace_node(at.0, at.1, values.iter().cloned())?;
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Script {
    #[serde(default, rename = "op")]
    pub ops: Vec<Operation>,
}

impl Script {
    pub fn parse(content: &str, path: &Path) -> CliResult<Self> {
        toml::from_str(content).map_err(|e| CliError::Script {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    #[instrument(level = "debug")]
    pub fn load(path: &Path) -> CliResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content, path)
    }

    /// Replays every step onto `silmaril`, returning the number of steps that
    /// failed and were skipped.
    ///
    /// In strict mode the first failing step aborts the run; steps are
    /// numbered from 1 in the error.
    #[instrument(level = "debug", skip(self, silmaril))]
    pub fn run(&self, silmaril: &mut Silmaril<String>, strict: bool) -> CliResult<usize> {
        let mut skipped = 0;
        for (i, op) in self.ops.iter().enumerate() {
            let step = i + 1;
            debug!(step, %op, "Applying");
            if let Err(source) = op.apply(silmaril) {
                if strict {
                    return Err(CliError::Step { step, source });
                }
                warn!(step, %op, error = %source, "Step skipped");
                skipped += 1;
            }
        }
        Ok(skipped)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_all_kinds() {
        let script = Script::parse(
            r#"
[[op]]
kind = "add_node"
value = "a"

[[op]]
kind = "add_nodes"
values = ["b", "c"]
at = [0, 0]

[[op]]
kind = "remove_node"
at = [1, 0]

[[op]]
kind = "remove_nodes"
depth = 1
start = 0
end = 1

[[op]]
kind = "clear_level"
depth = 2

[[op]]
kind = "replace_node"
at = [0, 0]
values = ["z"]
"#,
            Path::new("inline.toml"),
        )
        .unwrap();
        assert_eq!(script.ops.len(), 6);
        assert_eq!(
            script.ops[1],
            Operation::AddNodes {
                values: vec!["b".into(), "c".into()],
                at: Some((0, 0)),
            }
        );
        assert_eq!(script.ops[3], Operation::RemoveNodes { depth: 1, start: 0, end: 1 });
    }

    #[test]
    fn test_parse_rejects_unknown_kind() {
        let err = Script::parse("[[op]]\nkind = \"rotate\"\n", Path::new("bad.toml")).unwrap_err();
        assert!(matches!(err, CliError::Script { .. }));
    }

    #[test]
    fn test_empty_script_is_valid() {
        let script = Script::parse("", Path::new("empty.toml")).unwrap();
        assert!(script.ops.is_empty());
    }

    #[test]
    fn test_operation_display() {
        let op = Operation::RemoveNodes { depth: 2, start: 0, end: 4 };
        assert_eq!(op.to_string(), "remove_nodes depth 2 [0..4)");
    }
}

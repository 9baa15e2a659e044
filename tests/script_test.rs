//! End-to-end replay of operation scripts, as `silmaril run` does it.

use std::fs;
use std::path::PathBuf;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use silmaril::cli::commands::{render, run_script};
use silmaril::cli::CliError;
use silmaril::config::{OutputConfig, OutputFormat, Settings};
use silmaril::util::testing::init_test_setup;
use silmaril::SilmarilError;

const REFERENCE_SCRIPT: &str = r#"
[[op]]
kind = "add_nodes"
values = ["1", "2", "3", "4"]

[[op]]
kind = "add_nodes"
values = ["5", "6", "7"]
at = [1, 0]

[[op]]
kind = "add_nodes"
values = ["8", "9"]
at = [1, 1]

[[op]]
kind = "remove_node"
at = [1, 0]

[[op]]
kind = "remove_node"
at = [4, 4]

[[op]]
kind = "replace_node"
at = [1, 1]
values = ["40", "41"]
"#;

struct Workspace {
    _dir: TempDir,
    script: PathBuf,
}

#[fixture]
fn workspace() -> Workspace {
    init_test_setup();
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("ops.toml");
    fs::write(&script, REFERENCE_SCRIPT).unwrap();
    Workspace { _dir: dir, script }
}

fn settings(strict: bool, format: OutputFormat) -> Settings {
    Settings {
        strict,
        output: OutputConfig {
            format,
            show_index: false,
        },
    }
}

#[rstest]
fn given_lenient_mode_when_running_script_then_failing_step_is_skipped(workspace: Workspace) {
    let (silmaril, skipped) =
        run_script(&workspace.script, &settings(false, OutputFormat::Tree)).unwrap();

    assert_eq!(skipped, 1);
    let level1: Vec<&str> = silmaril
        .level_values(1)
        .unwrap()
        .into_iter()
        .map(String::as_str)
        .collect();
    assert_eq!(level1, vec!["3", "40"]);
    assert_eq!(silmaril.len(), 6);
}

#[rstest]
fn given_strict_mode_when_running_script_then_first_failure_aborts(workspace: Workspace) {
    let err = run_script(&workspace.script, &settings(true, OutputFormat::Tree)).unwrap_err();

    match err {
        CliError::Step { step, source } => {
            assert_eq!(step, 5);
            assert_eq!(source, SilmarilError::NotFound { depth: 4, index: 4 });
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[rstest]
fn given_levels_format_when_rendering_then_one_line_per_depth(workspace: Workspace) {
    let settings = settings(false, OutputFormat::Levels);
    let (silmaril, _) = run_script(&workspace.script, &settings).unwrap();

    assert_eq!(
        render(&silmaril, &settings),
        "LEVEL 0: [1]\nLEVEL 1: [3, 40]\nLEVEL 2: [8, 9, 41]"
    );
}

#[rstest]
fn given_tree_format_with_index_when_rendering_then_coordinates_shown(workspace: Workspace) {
    let mut settings = settings(false, OutputFormat::Tree);
    settings.output.show_index = true;
    let (silmaril, _) = run_script(&workspace.script, &settings).unwrap();

    let rendered = render(&silmaril, &settings);
    assert!(rendered.starts_with("1 (0:0)"));
    assert!(rendered.contains("40 (1:1)"));
    assert!(rendered.contains("41 (2:2)"));
}

#[rstest]
fn given_missing_script_when_running_then_io_error() {
    let err = run_script(
        &PathBuf::from("does/not/exist.toml"),
        &settings(false, OutputFormat::Tree),
    )
    .unwrap_err();
    assert!(matches!(err, CliError::Io { .. }));
    assert_eq!(err.exit_code(), silmaril::exitcode::NOINPUT);
}

#[rstest]
fn given_malformed_script_when_running_then_script_error() {
    let dir = TempDir::new().unwrap();
    let script = dir.path().join("bad.toml");
    fs::write(&script, "[[op]]\nkind = \"remove_node\"\nat = \"front\"\n").unwrap();

    let err = run_script(&script, &settings(false, OutputFormat::Tree)).unwrap_err();
    assert!(matches!(err, CliError::Script { .. }));
    assert_eq!(err.exit_code(), silmaril::exitcode::DATAERR);
}

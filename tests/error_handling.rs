// tests/error_handling.rs

use std::io::Write;
use std::path::Path;

use tempfile::NamedTempFile;

use stalerun::config::load_and_validate;
use stalerun::dag::{Resolver, TaskGraph};
use stalerun::errors::StalerunError;
use stalerun::fs::mock::MockFileSystem;

fn write_config(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    write!(file, "{contents}").unwrap();
    file
}

#[test]
fn test_dag_cycle_returns_structured_error() {
    let file = write_config(
        r#"
[task.A]
cmd = "echo A"
inputs = ["B"]

[task.B]
cmd = "echo B"
inputs = ["A"]
"#,
    );

    let result = load_and_validate(file.path());

    match result {
        Err(StalerunError::DagCycle(msg)) => {
            assert!(msg == "A -> B -> A" || msg == "B -> A -> B", "got {msg}");
        }
        Err(e) => panic!("Expected DagCycle error, got: {:?}", e),
        Ok(_) => panic!("Expected error, got Ok"),
    }
}

#[test]
fn test_cycle_via_glob_input_is_caught_at_resolution() {
    // The cycle only appears once `gen/*` is expanded against the
    // filesystem, so validation cannot see it.
    let file = write_config(
        r#"
[task.gen]
cmd = "codegen"
outputs = ["gen/out.rs"]
inputs = ["lib.a"]

[task.lib]
cmd = "ar rcs lib.a gen/out.rs"
outputs = ["lib.a"]
inputs = ["gen/*.rs"]
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();

    let fs = MockFileSystem::new();
    fs.add_file("gen/out.rs", 1);
    let graph = TaskGraph::build(&cfg, Path::new("."), &fs).unwrap();

    match Resolver::new(&graph, &fs).resolve("lib") {
        Err(StalerunError::DagCycle(path)) => assert_eq!(path, "lib -> gen -> lib"),
        other => panic!("Expected DagCycle, got: {:?}", other),
    }
}

#[test]
fn test_unknown_target_is_reported() {
    let file = write_config(
        r#"
[task.A]
cmd = "echo A"
outputs = ["a.out"]
"#,
    );
    let cfg = load_and_validate(file.path()).unwrap();
    let fs = MockFileSystem::new();
    let graph = TaskGraph::build(&cfg, Path::new("."), &fs).unwrap();

    let err = Resolver::new(&graph, &fs).resolve("all").unwrap_err();
    assert!(matches!(err, StalerunError::UnknownTarget(ref t) if t == "all"));
    assert_eq!(err.to_string(), "No rule to make target 'all'");
    assert_eq!(err.exit_code(), 1);
}

#[test]
fn test_invalid_toml_returns_toml_error() {
    let file = write_config("[task.A\ncmd = 1\n");
    assert!(matches!(
        load_and_validate(file.path()),
        Err(StalerunError::TomlError(_))
    ));
}

#[test]
fn test_missing_config_file_is_io_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(matches!(
        load_and_validate(dir.path().join("Stalerun.toml")),
        Err(StalerunError::IoError(_))
    ));
}

#[test]
fn test_conflicting_outputs_are_rejected_by_validation() {
    use stalerun_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};

    let result = ConfigFileBuilder::new()
        .with_task("a", TaskConfigBuilder::new("make a").output("out/app.bin").build())
        .with_task("b", TaskConfigBuilder::new("make b").output("./out/app.bin").build())
        .try_build();

    match result {
        Err(StalerunError::ConfigError(msg)) => {
            assert!(msg.contains("declared by both"), "got {msg}");
        }
        other => panic!("Expected ConfigError, got: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_unknown_default_target_is_rejected() {
    use stalerun_test_utils::builders::{ConfigFileBuilder, TaskConfigBuilder};

    let result = ConfigFileBuilder::new()
        .with_default_target("release")
        .with_task("a", TaskConfigBuilder::new("make a").output("a.out").build())
        .try_build();

    assert!(matches!(result, Err(StalerunError::ConfigError(_))));
}

//! Tests that run the `testbundle` binary and check what the shell sees

use std::fs;
use std::path::Path;
use std::process::{Command, Output};

fn testbundle(dir: &Path, args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_testbundle"))
        .args(args)
        .arg("--no-color")
        .current_dir(dir)
        .env_remove("TESTBUNDLE_PATH")
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to run testbundle")
}

#[test]
fn test_missing_bundle_exits_one_with_nothing_on_stdout() {
    let dir = tempfile::tempdir().unwrap();
    let output = testbundle(dir.path(), &["build/test_bundle.json"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty(), "stdout: {}", String::from_utf8_lossy(&output.stdout));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("test bundle not found"), "stderr: {}", stderr);
}

#[test]
fn test_failing_spec_exits_one() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("b.json"),
        r#"{ "specs": [
            { "name": "A", "expect": [{ "actual": 1, "matcher": "toEqual", "expected": 1 }] },
            { "name": "B", "expect": [{ "actual": 1, "matcher": "toEqual", "expected": 2 }] }
        ] }"#,
    )
    .unwrap();
    let output = testbundle(dir.path(), &["run", "b.json"]);

    assert_eq!(output.status.code(), Some(1));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("expected 1 to equal 2"), "stdout: {}", stdout);
    assert!(stdout.contains("2 run, 1 failed"), "stdout: {}", stdout);
}

#[test]
fn test_empty_bundle_exits_zero() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("b.json"), "{}").unwrap();
    let output = testbundle(dir.path(), &["b.json"]);

    assert!(
        output.status.success(),
        "status={:?} stderr={}",
        output.status,
        String::from_utf8_lossy(&output.stderr)
    );
    assert!(String::from_utf8_lossy(&output.stdout).contains("0 run, 0 failed"));
}

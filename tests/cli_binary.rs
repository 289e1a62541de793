//! End-to-end tests of the `goref` binary.
//!
//! These pin the process contract: what goes to stdout, what goes to stderr,
//! and the exit code for each error kind.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

// ============================================================================
// Test Infrastructure
// ============================================================================

fn goref_binary() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_goref"))
}

fn greet_module() -> TempDir {
    let temp = TempDir::new().unwrap();
    fs::write(temp.path().join("go.mod"), "module example.com/greet\n\ngo 1.22\n").unwrap();
    fs::write(temp.path().join("a.go"), "package main\n\nfunc Greet() {}\n").unwrap();
    fs::write(
        temp.path().join("b.go"),
        "package main\n\nfunc main() {\n\tGreet()\n}\n",
    )
    .unwrap();
    temp
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(goref_binary())
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .args(args)
        .output()
        .expect("failed to run goref")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).into_owned()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).into_owned()
}

// ============================================================================
// list-refs
// ============================================================================

#[test]
fn list_refs_prints_locations() {
    let temp = greet_module();
    let output = run(temp.path(), &["list-refs", "./a.go", "Greet"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(stdout(&output), "b.go:4:2\n");
}

#[test]
fn list_refs_unknown_symbol_exits_with_resolution_code() {
    let temp = greet_module();
    let output = run(temp.path(), &["list-refs", "./a.go", "Missing"]);
    assert_eq!(output.status.code(), Some(3));
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).starts_with("Error: symbol Missing not found in file"));
}

#[test]
fn list_refs_json_error_goes_to_stdout() {
    let temp = greet_module();
    let output = run(
        temp.path(),
        &["--format", "json", "list-refs", "./a.go", "Missing"],
    );
    assert_eq!(output.status.code(), Some(3));
    let json: Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["kind"], "not_found");
}

// ============================================================================
// rename
// ============================================================================

#[test]
fn rename_prints_summary_and_rewrites() {
    let temp = greet_module();
    let output = run(temp.path(), &["rename", "./a.go", "Greet", "Hello"]);
    assert!(output.status.success(), "stderr: {}", stderr(&output));
    assert_eq!(
        stdout(&output),
        "Renamed 'Greet' -> 'Hello' in:\n- a.go (1 occurrences)\n- b.go (1 occurrences)\n"
    );
    let b = fs::read_to_string(temp.path().join("b.go")).unwrap();
    assert_eq!(b, "package main\n\nfunc main() {\n\tHello()\n}\n");
}

#[test]
fn rename_conflict_exits_with_apply_code() {
    let temp = greet_module();
    let output = run(temp.path(), &["rename", "./a.go", "Greet", "main"]);
    assert_eq!(output.status.code(), Some(4));
    assert_eq!(
        stderr(&output).trim_end(),
        "Error: new symbol name main conflicts with existing symbol"
    );
    let a = fs::read_to_string(temp.path().join("a.go")).unwrap();
    assert_eq!(a, "package main\n\nfunc Greet() {}\n");
}

#[test]
fn rename_invalid_name_exits_with_argument_code() {
    let temp = greet_module();
    let output = run(temp.path(), &["rename", "./a.go", "Greet", "9lives"]);
    assert_eq!(output.status.code(), Some(2));
}

#[test]
fn missing_file_is_an_error() {
    let temp = greet_module();
    let output = run(temp.path(), &["list-refs", "./nope.go", "Greet"]);
    assert!(!output.status.success());
    assert!(stderr(&output).starts_with("Error: "));
}

#[test]
fn help_lists_subcommands() {
    let temp = TempDir::new().unwrap();
    let output = run(temp.path(), &["help"]);
    assert!(output.status.success());
    let text = stdout(&output);
    assert!(text.contains("list-refs"));
    assert!(text.contains("rename"));
    assert!(text.contains("mcp"));
}

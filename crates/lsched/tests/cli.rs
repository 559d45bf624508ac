//! End-to-end tests for the `lsched` binary.

use std::path::Path;
use std::process::{Command, Output};

use tempfile::TempDir;

const LISTING: &str = "\
func f
block entry:
  v1 = add v0, v0
  v2 = load v0
  v3 = mul v2, v2
  store v3, v0
  ret v1
";

fn write_listing(dir: &TempDir, src: &str) -> std::path::PathBuf {
    let path = dir.path().join("input.ls");
    std::fs::write(&path, src).unwrap();
    path
}

fn lsched(args: &[&str], input: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_lsched"))
        .args(args)
        .arg(input)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

#[test]
fn test_schedule_prints_reordered_listing() {
    let dir = TempDir::new().unwrap();
    let input = write_listing(&dir, LISTING);
    let output = lsched(&["schedule", "--verify"], &input);
    assert!(output.status.success());

    let stdout = String::from_utf8(output.stdout).unwrap();
    let expected = "\
func f
block entry:
  v2 = load v0
  v3 = mul v2, v2
  v1 = add v0, v0
  store v3, v0
  ret v1
";
    assert_eq!(stdout, expected);
}

#[test]
fn test_generic_arch_passes_through() {
    let dir = TempDir::new().unwrap();
    let input = write_listing(&dir, LISTING);
    let output = lsched(&["schedule", "--arch", "generic"], &input);
    assert!(output.status.success());
    assert_eq!(String::from_utf8(output.stdout).unwrap(), LISTING);
}

#[test]
fn test_parse_error_fails() {
    let dir = TempDir::new().unwrap();
    let input = write_listing(&dir, "func f\nblock b:\n  v1 = bogus v0\n");
    let output = lsched(&["schedule"], &input);
    assert_eq!(output.status.code(), Some(1));
    assert!(output.stdout.is_empty());
}

#[test]
fn test_missing_file_fails() {
    let dir = TempDir::new().unwrap();
    let output = lsched(&["schedule"], &dir.path().join("missing.ls"));
    assert_eq!(output.status.code(), Some(1));
}

#[test]
fn test_stress_passes() {
    let dir = TempDir::new().unwrap();
    let input = write_listing(&dir, LISTING);
    let output = lsched(&["stress", "--seeds", "64", "-j", "2"], &input);
    assert!(output.status.success());
}

#[test]
fn test_schedule_rejects_misplaced_terminator() {
    let dir = TempDir::new().unwrap();
    let input = write_listing(&dir, "block b:\n  nop\n  jump\n  v1 = load v0\n  ret v1\n");
    for args in [&["schedule"][..], &["schedule", "--verify"][..]] {
        let output = lsched(args, &input);
        assert_eq!(output.status.code(), Some(1));
        assert!(output.stdout.is_empty());
        let stderr = String::from_utf8(output.stderr).unwrap();
        assert!(stderr.contains("malformed block"));
        assert!(!stderr.contains("panicked"));
    }
}

#[test]
fn test_stress_reports_misplaced_terminator() {
    let dir = TempDir::new().unwrap();
    let input = write_listing(&dir, "block b:\n  jump\n  nop\n");
    let output = lsched(&["stress", "--seeds", "4"], &input);
    assert_eq!(output.status.code(), Some(1));
}

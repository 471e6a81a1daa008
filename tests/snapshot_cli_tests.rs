// End-to-end tests for the hwsnap binary over synthetic trees
//
// Every run uses --force-linux with a temporary --root so the curated
// /proc and /sys paths are left out by the containment rule.

use assert_cmd::Command;
use predicates::prelude::*;
use sha2::{Digest, Sha256};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn hwsnap(root: &Path) -> Command {
    let mut cmd = Command::cargo_bin("hwsnap").unwrap();
    cmd.arg("--force-linux").arg("--root").arg(root);
    cmd
}

fn ndjson(stdout: &[u8]) -> Vec<serde_json::Value> {
    String::from_utf8(stdout.to_vec())
        .unwrap()
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect()
}

fn records(stdout: &[u8]) -> Vec<serde_json::Value> {
    let mut lines = ndjson(stdout);
    assert!(lines[0].get("meta").is_some(), "first line must be meta");
    lines.remove(0);
    lines
}

fn sha256_hex(bytes: &[u8]) -> String {
    hex::encode(Sha256::digest(bytes))
}

// ============================================================================
// Text / binary classification
// ============================================================================

#[test]
fn test_text_and_binary_files() {
    let tmp = TempDir::new().unwrap();
    let text = "0123456789".repeat(5);
    fs::write(tmp.path().join("a.txt"), &text).unwrap();
    fs::write(tmp.path().join("b.bin"), b"head\0tail").unwrap();

    let output = hwsnap(tmp.path())
        .arg("--max-file-bytes")
        .arg("1024")
        .output()
        .unwrap();
    assert!(output.status.success());

    let recs = records(&output.stdout);
    assert_eq!(recs.len(), 2);

    assert!(recs[0]["path"].as_str().unwrap().ends_with("a.txt"));
    assert_eq!(recs[0]["kind"], "file");
    assert_eq!(recs[0]["content_text"], text.as_str());
    assert!(recs[0]["content_base64"].is_null());
    assert_eq!(recs[0]["truncated"], false);
    assert_eq!(recs[0]["source"], "linux");

    assert!(recs[1]["path"].as_str().unwrap().ends_with("b.bin"));
    assert_eq!(recs[1]["content_base64"], "aGVhZAB0YWls");
    assert!(recs[1]["content_text"].is_null());
    assert_eq!(recs[1]["truncated"], false);
}

// ============================================================================
// Caps
// ============================================================================

#[test]
fn test_per_file_cap_truncates_and_hashes_retained_bytes() {
    let tmp = TempDir::new().unwrap();
    let body = "abcdefghij".repeat(10);
    fs::write(tmp.path().join("hundred"), &body).unwrap();

    let output = hwsnap(tmp.path())
        .arg("--max-file-bytes")
        .arg("10")
        .output()
        .unwrap();
    assert!(output.status.success());

    let recs = records(&output.stdout);
    assert_eq!(recs.len(), 1);
    assert_eq!(recs[0]["truncated"], true);
    assert_eq!(recs[0]["content_text"], "abcdefghij");
    assert_eq!(recs[0]["sha256_hex"], sha256_hex(b"abcdefghij").as_str());
    assert_eq!(recs[0]["size"], 100);
}

#[test]
fn test_global_cap_exhausts_budget() {
    let tmp = TempDir::new().unwrap();
    for name in ["a", "b", "c", "d", "e"] {
        fs::write(tmp.path().join(name), "z".repeat(30)).unwrap();
    }

    let output = hwsnap(tmp.path())
        .arg("--max-total-bytes")
        .arg("50")
        .output()
        .unwrap();
    assert!(output.status.success());

    let recs = records(&output.stdout);
    assert_eq!(recs.len(), 5);

    let retained: usize = recs
        .iter()
        .filter_map(|r| r["content_text"].as_str())
        .map(str::len)
        .sum();
    assert!(retained <= 50);

    for rec in &recs[2..] {
        assert_eq!(rec["error"], "budget-exhausted");
        assert!(rec["content_text"].is_null());
    }
}

// ============================================================================
// Filtering and pruning
// ============================================================================

#[test]
fn test_exclude_pattern_prunes_whole_subtree() {
    let tmp = TempDir::new().unwrap();
    let secret = tmp.path().join("secret");
    fs::create_dir_all(secret.join("deeper/still")).unwrap();
    fs::write(secret.join("x"), "hidden").unwrap();
    fs::write(secret.join("deeper/still/y"), "hidden").unwrap();
    fs::write(tmp.path().join("visible"), "shown").unwrap();

    let output = hwsnap(tmp.path())
        .arg("--exclude-glob")
        .arg("*/secret*")
        .output()
        .unwrap();
    assert!(output.status.success());

    let recs = records(&output.stdout);
    assert_eq!(recs.len(), 1);
    assert!(recs
        .iter()
        .all(|r| !r["path"].as_str().unwrap().contains("/secret")));
}

#[test]
fn test_deny_listed_directories_never_appear() {
    let tmp = TempDir::new().unwrap();
    for name in ["power", "tracing", "debug"] {
        let nested = tmp.path().join("device0").join(name).join("a/b/c");
        fs::create_dir_all(&nested).unwrap();
        fs::write(nested.join("leaf"), "1").unwrap();
    }
    fs::write(tmp.path().join("device0/uevent"), "DRIVER=x\n").unwrap();

    let output = hwsnap(tmp.path()).output().unwrap();
    assert!(output.status.success());

    let recs = records(&output.stdout);
    assert_eq!(recs.len(), 1);
    assert!(recs[0]["path"].as_str().unwrap().ends_with("device0/uevent"));
}

#[test]
fn test_include_and_exclude_precedence() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("product_name"), "Box").unwrap();
    fs::write(tmp.path().join("product_serial"), "S3CR3T").unwrap();
    fs::write(tmp.path().join("other"), "no").unwrap();

    let output = hwsnap(tmp.path())
        .arg("--include-glob")
        .arg("*/product_*")
        .arg("--exclude-glob")
        .arg("*/product_serial")
        .output()
        .unwrap();
    assert!(output.status.success());

    let recs = records(&output.stdout);
    assert_eq!(recs.len(), 1);
    assert!(recs[0]["path"].as_str().unwrap().ends_with("product_name"));
}

// ============================================================================
// Symlinks
// ============================================================================

#[test]
fn test_symlink_recorded_without_content() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("target"), "data").unwrap();
    std::os::unix::fs::symlink("target", tmp.path().join("alias")).unwrap();

    let output = hwsnap(tmp.path()).output().unwrap();
    let recs = records(&output.stdout);
    let alias = recs
        .iter()
        .find(|r| r["path"].as_str().unwrap().ends_with("alias"))
        .unwrap();
    assert_eq!(alias["kind"], "symlink");
    assert_eq!(alias["link_target"], "target");
    assert!(alias["content_text"].is_null());
    assert!(alias["content_base64"].is_null());
    assert!(alias["sha256_hex"].is_null());
}

#[test]
fn test_follow_symlinks_reads_target() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("target"), "data").unwrap();
    std::os::unix::fs::symlink("target", tmp.path().join("alias")).unwrap();

    let output = hwsnap(tmp.path()).arg("--follow-symlinks").output().unwrap();
    let recs = records(&output.stdout);
    let alias = recs
        .iter()
        .find(|r| r["path"].as_str().unwrap().ends_with("alias"))
        .unwrap();
    assert_eq!(alias["kind"], "symlink");
    assert_eq!(alias["content_text"], "data");
}

// ============================================================================
// Output formats and exit codes
// ============================================================================

#[test]
fn test_json_format_wraps_meta_and_records() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("f"), "x").unwrap();

    let output = hwsnap(tmp.path())
        .arg("--format")
        .arg("json")
        .arg("--pretty")
        .output()
        .unwrap();
    assert!(output.status.success());

    let value: serde_json::Value = serde_json::from_slice(&output.stdout).unwrap();
    assert_eq!(value["meta"]["program"], "hwsnap");
    assert_eq!(value["meta"]["version"], env!("CARGO_PKG_VERSION"));
    assert_eq!(value["records"].as_array().unwrap().len(), 1);
}

#[test]
fn test_text_format() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("f"), "line one\n").unwrap();

    hwsnap(tmp.path())
        .arg("--format")
        .arg("text")
        .assert()
        .success()
        .stdout(predicate::str::starts_with("# hwsnap "))
        .stdout(predicate::str::contains("(kind=file) =====\nline one\n\n"));
}

#[test]
fn test_unknown_format_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    hwsnap(tmp.path())
        .arg("--format")
        .arg("xml")
        .assert()
        .failure()
        .code(2)
        .stdout(predicate::str::is_empty());
}

#[test]
fn test_invalid_glob_fails_without_output() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("f"), "x").unwrap();

    hwsnap(tmp.path())
        .arg("--include-glob")
        .arg("[")
        .assert()
        .failure()
        .code(1)
        .stdout(predicate::str::is_empty())
        .stderr(predicate::str::contains("Invalid"));
}

#[test]
fn test_empty_root_emits_only_meta() {
    let tmp = TempDir::new().unwrap();
    let output = hwsnap(tmp.path()).output().unwrap();
    assert!(output.status.success());

    let lines = ndjson(&output.stdout);
    assert_eq!(lines.len(), 1);
    assert!(lines[0]["meta"]["host"].is_string());
}

#[test]
fn test_version_flag() {
    Command::cargo_bin("hwsnap")
        .unwrap()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains(env!("CARGO_PKG_VERSION")));
}

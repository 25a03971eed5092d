use std::{fs, path::PathBuf};

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

/// A scratch workspace with its own config file pointing at a private data directory.
struct Workspace {
    dir: TempDir,
    config: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let config = dir.path().join("config.json");
        let data_dir = dir.path().join("data");
        fs::write(
            &config,
            serde_json::json!({ "data_dir": data_dir, "list_limit": 10 }).to_string(),
        )
        .unwrap();
        Self { dir, config }
    }

    fn cmd(&self) -> Command {
        let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("bookmarkhub"));
        cmd.arg("--config").arg(&self.config);
        cmd
    }

    fn data_file(&self) -> PathBuf {
        self.dir.path().join("data").join("bookmarks.json")
    }

    fn stored(&self) -> Vec<serde_json::Value> {
        let content = fs::read_to_string(self.data_file()).unwrap();
        serde_json::from_str(&content).unwrap()
    }
}

#[test]
fn test_help_lists_commands() {
    Command::new(assert_cmd::cargo::cargo_bin!("bookmarkhub"))
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("add"))
        .stdout(predicate::str::contains("import"))
        .stdout(predicate::str::contains("rename-category"));
}

#[test]
fn test_canonicalize_prints_normalized_url() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["canonicalize", "HTTPS://Example.COM/Docs/#intro"])
        .assert()
        .success()
        .stdout("https://example.com/Docs\n");
}

#[test]
fn test_add_twice_updates_existing() {
    let ws = Workspace::new();

    ws.cmd()
        .args(["add", "https://Example.com/Path/", "-T", "First", "-t", "a,b"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bookmark created with ID:"));

    ws.cmd()
        .args(["add", "https://example.com/Path", "-T", "Second", "-t", "b,c"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Bookmark already existed, updated:"))
        .stdout(predicate::str::contains("(visits: 2)"));

    let stored = ws.stored();
    assert_eq!(stored.len(), 1);
    assert_eq!(stored[0]["title"], "Second");
    assert_eq!(stored[0]["visitCount"], 2);
    assert_eq!(stored[0]["tags"], serde_json::json!(["b", "c"]));
}

#[test]
fn test_check_reports_both_states() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["add", "https://rust-lang.org/", "-T", "Rust"])
        .assert()
        .success();

    ws.cmd()
        .args(["check", "https://RUST-LANG.org/#top"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already bookmarked:"))
        .stdout(predicate::str::contains("Rust"));

    ws.cmd()
        .args(["check", "https://crates.io/"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Not bookmarked: https://crates.io/"));
}

#[test]
fn test_import_then_list_by_category() {
    let ws = Workspace::new();
    let import = ws.dir.path().join("import.json");
    fs::write(
        &import,
        r#"[
            {"url": "https://docs.rs", "title": "Docs", "category": "development"},
            {"url": "https://figma.com", "title": "Figma", "category": "design"},
            {"title": "Missing url"}
        ]"#,
    )
    .unwrap();

    ws.cmd()
        .arg("import")
        .arg(&import)
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Import complete: 2 added, 0 updated, 1 skipped (2 total bookmarks)",
        ))
        .stdout(predicate::str::contains("Missing URL"));

    ws.cmd()
        .args(["list", "--category", "design"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Figma"))
        .stdout(predicate::str::contains("Docs").not())
        .stdout(predicate::str::contains("Found 1 bookmark"));

    ws.cmd()
        .args(["list", "--search", "nothing-matches"])
        .assert()
        .success()
        .stdout(predicate::str::contains("No bookmarks found matching the criteria."));
}

#[test]
fn test_import_rejects_non_array() {
    let ws = Workspace::new();
    let import = ws.dir.path().join("import.json");
    fs::write(&import, r#"{"url": "https://docs.rs"}"#).unwrap();

    ws.cmd()
        .arg("import")
        .arg(&import)
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error:"));
}

#[test]
fn test_rename_and_delete_category() {
    let ws = Workspace::new();
    for url in ["https://a.com", "https://b.com"] {
        ws.cmd()
            .args(["add", url, "-c", "reading"])
            .assert()
            .success();
    }

    ws.cmd()
        .args(["rename-category", "reading", "later"])
        .assert()
        .success()
        .stdout("Renamed category 'reading' to 'later' on 2 bookmarks\n");

    ws.cmd()
        .args(["delete-category", "later"])
        .assert()
        .success();

    ws.cmd()
        .args(["categories", "--json"])
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""name": "other""#))
        .stdout(predicate::str::contains("later").not());
}

#[test]
fn test_delete_by_url_with_force() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["add", "https://a.com/page", "-T", "Page"])
        .assert()
        .success();

    ws.cmd()
        .args(["delete", "--url", "https://A.com/page/", "--force"])
        .assert()
        .success()
        .stdout(predicate::str::contains("has been permanently deleted"));

    assert!(ws.stored().is_empty());

    ws.cmd()
        .args(["delete", "--url", "https://a.com/page", "--force"])
        .assert()
        .failure();
}

#[test]
fn test_show_unknown_id_fails() {
    let ws = Workspace::new();
    ws.cmd()
        .args(["show", "no-such-id"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("no-such-id"));
}

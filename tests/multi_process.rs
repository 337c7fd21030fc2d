/// Several `shelldock` processes sharing one config root
///
/// Each child is a separate OS process, so these cover the cross-process
/// lock rather than the in-process thread tests.

use shelldock_lib::{DocumentStore, StoreConfig};
use std::fs;
use std::path::Path;
use std::process::{Command, Output};
use tempfile::TempDir;

const BIN: &str = env!("CARGO_BIN_EXE_shelldock");

fn shelldock(home: &Path) -> Command {
    let mut command = Command::new(BIN);
    command
        .env("SHELLDOCK_HOME", home)
        .env("SHELLDOCK_LOCK_TIMEOUT_MS", "30000")
        .env_remove("SHELLDOCK_LOG");
    command
}

fn run(home: &Path, args: &[&str]) -> Output {
    shelldock(home).args(args).output().unwrap()
}

#[test]
fn test_concurrent_jumps_all_counted() {
    let home = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let target_path = target.path().display().to_string();

    let added = run(home.path(), &["jump", "add", "docs", &target_path]);
    assert!(added.status.success(), "{:?}", added);

    const JUMPS: usize = 10;
    let children: Vec<_> = (0..JUMPS)
        .map(|_| {
            shelldock(home.path())
                .args(["jump", "go", "docs"])
                .stdout(std::process::Stdio::piped())
                .spawn()
                .unwrap()
        })
        .collect();

    for child in children {
        let output = child.wait_with_output().unwrap();
        assert!(output.status.success(), "{:?}", output);
        assert_eq!(String::from_utf8_lossy(&output.stdout).trim(), target_path);
    }

    let mut store = DocumentStore::new(StoreConfig::new(home.path()));
    let doc = store.load("quickjump").unwrap();
    assert_eq!(doc["docs"]["useCount"], JUMPS as u64);
}

#[test]
fn test_go_prints_only_the_path() {
    let home = TempDir::new().unwrap();
    let target = TempDir::new().unwrap();
    let target_path = target.path().display().to_string();

    run(home.path(), &["jump", "add", "projects", &target_path]);
    let output = run(home.path(), &["jump", "go", "proj"]);

    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), format!("{}\n", target_path));
}

#[test]
fn test_unknown_alias_fails() {
    let home = TempDir::new().unwrap();
    let output = run(home.path(), &["jump", "go", "nowhere"]);

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("nowhere"));
}

#[test]
fn test_corrupt_store_is_backed_up_and_reset() {
    let home = TempDir::new().unwrap();
    let dir = home.path().join("quickjump");
    fs::create_dir_all(&dir).unwrap();
    fs::write(dir.join("store.json"), "{ not json").unwrap();

    let output = run(home.path(), &["jump", "list"]);
    assert!(output.status.success(), "{:?}", output);

    let backups: Vec<_> = fs::read_dir(&dir)
        .unwrap()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_name().to_string_lossy().contains(".backup."))
        .collect();
    assert_eq!(backups.len(), 1);
    assert_eq!(fs::read_to_string(backups[0].path()).unwrap(), "{ not json");
    assert_eq!(fs::read_to_string(dir.join("store.json")).unwrap().trim(), "{}");
}

#[test]
fn test_components_are_separate_files() {
    let home = TempDir::new().unwrap();
    let archive = home.path().join("starter.zip");

    run(home.path(), &["jump", "add", "home", &home.path().display().to_string()]);
    let added = run(
        home.path(),
        &["template", "add", "starter", &archive.display().to_string(), "Basic", "layout"],
    );
    assert!(added.status.success(), "{:?}", added);

    let used = run(home.path(), &["template", "use", "starter"]);
    assert_eq!(
        String::from_utf8_lossy(&used.stdout).trim(),
        archive.display().to_string()
    );

    assert!(home.path().join("quickjump").join("store.json").is_file());
    assert!(home.path().join("templater").join("store.json").is_file());

    let mut store = DocumentStore::new(StoreConfig::new(home.path()));
    let templates = store.load("templater").unwrap();
    assert_eq!(templates["starter"]["description"], "Basic layout");
    assert!(store.load("quickjump").unwrap().get("starter").is_none());
}

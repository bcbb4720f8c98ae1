use std::fs;

use tempfile::TempDir;
use viewr_engine::{JsonFileStore, KeyValueStore, MemoryStore, StoreError};

#[test]
fn entries_survive_reopen() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    assert_eq!(store.get("#req_text_form_last_hash"), None);
    store.set("#req_text_form_last_hash", "-1794106052").unwrap();

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(
        reopened.get("#req_text_form_last_hash").as_deref(),
        Some("-1794106052")
    );
}

#[test]
fn set_overwrites_previous_value() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("nested").join("store.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    store.set("k", "1").unwrap();
    store.set("k", "2").unwrap();

    let text = fs::read_to_string(&path).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(parsed["k"], "2");
}

#[test]
fn corrupt_file_is_reported() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("store.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(JsonFileStore::open(&path).is_err());
}

#[test]
fn memory_store_round_trip() {
    let mut store = MemoryStore::new();
    assert!(store.is_empty());
    store.set("a", "1").unwrap();
    assert_eq!(store.get("a").as_deref(), Some("1"));
    assert_eq!(store.len(), 1);
}

#[test]
fn set_creates_missing_parent_dirs() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("a").join("b").join("store.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    store.set("k", "1").unwrap();
    assert!(path.is_file());
    assert_eq!(store.path(), path.as_path());
}

#[test]
fn failed_set_leaves_no_file_behind() {
    let temp = TempDir::new().unwrap();
    let blocker = temp.path().join("not_a_dir");
    let path = blocker.join("store.json");
    let mut store = JsonFileStore::open(&path).unwrap();
    fs::write(&blocker, "x").unwrap();

    let err = store.set("k", "1").unwrap_err();
    assert!(matches!(err, StoreError::Directory(_)));
    assert!(!path.exists());
    assert_eq!(fs::read_to_string(&blocker).unwrap(), "x");
}

use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use history_store::{
    HistoryBackend, HistoryStore, HistoryStoreError, JsonFileBackend, MemoryBackend,
    HISTORY_CAPACITY,
};
use pretty_assertions::assert_eq;
use tempfile::TempDir;

fn history_file(contents: Option<&str>) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir should be created");
    let path = dir.path().join("history.json");
    if let Some(contents) = contents {
        fs::write(&path, contents).expect("history fixture should be written");
    }
    (dir, path)
}

struct FailingBackend;

impl HistoryBackend for FailingBackend {
    fn load(&self) -> Result<Vec<String>, HistoryStoreError> {
        Err(HistoryStoreError::Unavailable {
            reason: "disk on fire".to_string(),
        })
    }

    fn save(&self, _entries: &[String]) -> Result<(), HistoryStoreError> {
        Err(HistoryStoreError::Unavailable {
            reason: "disk on fire".to_string(),
        })
    }
}

#[test]
fn load_reads_most_recent_first() {
    let (_dir, path) = history_file(Some(r#"["newest", "middle", "oldest"]"#));
    let store = HistoryStore::load(Arc::new(JsonFileBackend::new(&path)));
    assert_eq!(store.entries(), ["newest", "middle", "oldest"]);
}

#[test]
fn load_missing_file_is_empty_history() {
    let (_dir, path) = history_file(None);
    let store = HistoryStore::load(Arc::new(JsonFileBackend::new(&path)));
    assert!(store.is_empty());
    assert!(store.is_loaded());
}

#[test]
fn load_malformed_file_fails_soft() {
    let (_dir, path) = history_file(Some("[\"unterminated"));
    let store = HistoryStore::load(Arc::new(JsonFileBackend::new(&path)));
    assert!(store.is_empty());
}

#[test]
fn load_wrong_shape_fails_soft() {
    let (_dir, path) = history_file(Some("[1, 2, 3]"));
    let store = HistoryStore::load(Arc::new(JsonFileBackend::new(&path)));
    assert!(store.is_empty());
}

#[test]
fn load_caps_oversized_files() {
    let entries: Vec<String> = (0..150).map(|i| format!("line {i}")).collect();
    let body = serde_json::to_string(&entries).expect("fixture serializes");
    let (_dir, path) = history_file(Some(&body));

    let store = HistoryStore::load(Arc::new(JsonFileBackend::new(&path)));
    assert_eq!(store.len(), HISTORY_CAPACITY);
    assert_eq!(store.get(0), Some("line 0"));
    assert_eq!(store.get(HISTORY_CAPACITY - 1), Some("line 99"));
}

#[test]
fn record_persists_to_disk() {
    let (_dir, path) = history_file(Some(r#"["older"]"#));
    let mut store = HistoryStore::load(Arc::new(JsonFileBackend::new(&path)));

    store.record("fresh");
    store.flush();

    let on_disk: Vec<String> =
        serde_json::from_str(&fs::read_to_string(&path).expect("history file exists"))
            .expect("history file is a JSON array");
    assert_eq!(on_disk, ["fresh", "older"]);
}

#[test]
fn recording_a_duplicate_moves_it_to_front_without_growing() {
    let backend = MemoryBackend::with_entries(["a", "b", "c"]);
    let mut store = HistoryStore::load(Arc::new(backend.clone()));

    store.record("c");
    store.flush();

    assert_eq!(store.entries(), ["c", "a", "b"]);
    assert_eq!(backend.snapshot(), ["c", "a", "b"]);
}

#[test]
fn recording_101st_unique_entry_drops_oldest() {
    let mut store = HistoryStore::in_memory();
    for i in 1..=HISTORY_CAPACITY + 1 {
        store.record(&format!("entry {i}"));
    }
    assert_eq!(store.len(), HISTORY_CAPACITY);
    assert_eq!(store.get(0), Some("entry 101"));
    assert!(!store.entries().iter().any(|entry| entry == "entry 1"));
}

#[test]
fn whitespace_entry_is_not_recorded_or_persisted() {
    let backend = MemoryBackend::new();
    let mut store = HistoryStore::load(Arc::new(backend.clone()));

    assert!(!store.record("   "));
    store.flush();

    assert!(store.is_empty());
    assert_eq!(backend.saves(), 0);
}

#[test]
fn persistence_failures_do_not_affect_memory_state() {
    let mut store = HistoryStore::load(Arc::new(FailingBackend));
    assert!(store.is_empty());

    assert!(store.record("still here"));
    store.flush();

    assert_eq!(store.entries(), ["still here"]);
}

#[test]
fn background_load_merges_behind_session_entries() {
    let backend = MemoryBackend::with_entries(["persisted", "shared"]);
    let mut store = HistoryStore::spawn_load(Arc::new(backend.clone()));

    // Whatever the loader's timing, the merge result is the same.
    store.record("shared");
    store.wait_loaded();
    store.flush();

    assert!(store.is_loaded());
    assert_eq!(store.entries(), ["shared", "persisted"]);
    assert_eq!(backend.snapshot(), ["shared", "persisted"]);
}

#[test]
fn background_load_without_records_does_not_rewrite() {
    let backend = MemoryBackend::with_entries(["persisted"]);
    let mut store = HistoryStore::spawn_load(Arc::new(backend.clone()));

    store.wait_loaded();
    store.flush();

    assert_eq!(store.entries(), ["persisted"]);
    assert_eq!(backend.saves(), 0);
}

#[test]
fn poll_loaded_is_true_for_synchronous_stores() {
    let mut store = HistoryStore::in_memory();
    assert!(store.poll_loaded());
}

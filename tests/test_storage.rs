use haunted_run::storage::*;

use tempfile::tempdir;

// ── MemoryStore ───────────────────────────────────────────────────────────────

#[test]
fn empty_store_reads_zero() {
    let store = MemoryStore::new();
    assert_eq!(load_high_score(&store), 0);
}

#[test]
fn non_numeric_value_reads_zero() {
    let mut store = MemoryStore::new();
    store.set(HIGH_SCORE_KEY, "boo!").unwrap();
    assert_eq!(load_high_score(&store), 0);
}

#[test]
fn higher_score_is_recorded() {
    let mut store = MemoryStore::new();
    store.set(HIGH_SCORE_KEY, "300").unwrap();
    assert!(record_high_score(&mut store, 450));
    assert_eq!(store.get(HIGH_SCORE_KEY).as_deref(), Some("450"));
    assert_eq!(load_high_score(&store), 450);
}

#[test]
fn equal_or_lower_score_is_ignored() {
    let mut store = MemoryStore::new();
    store.set(HIGH_SCORE_KEY, "300").unwrap();
    assert!(!record_high_score(&mut store, 300));
    assert!(!record_high_score(&mut store, 12));
    assert_eq!(store.get(HIGH_SCORE_KEY).as_deref(), Some("300"));
}

#[test]
fn recording_twice_is_idempotent() {
    let mut store = MemoryStore::new();
    assert!(record_high_score(&mut store, 900));
    assert!(!record_high_score(&mut store, 900));
    assert_eq!(load_high_score(&store), 900);
}

#[test]
fn shared_store_is_one_store() {
    let store = shared(MemoryStore::new());
    let other = store.clone();
    record_high_score(&mut *store.borrow_mut(), 77);
    assert_eq!(load_high_score(&*other.borrow()), 77);
}

// ── FileStore ─────────────────────────────────────────────────────────────────

#[test]
fn file_store_survives_reopen() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");

    let mut store = FileStore::open(&path);
    assert_eq!(store.path(), path.as_path());
    assert!(record_high_score(&mut store, 1500));

    let reopened = FileStore::open(&path);
    assert_eq!(load_high_score(&reopened), 1500);
}

#[test]
fn missing_file_starts_empty() {
    let dir = tempdir().unwrap();
    let store = FileStore::open(dir.path().join("nope.json"));
    assert_eq!(store.get(HIGH_SCORE_KEY), None);
}

#[test]
fn corrupt_file_starts_empty_and_is_replaced() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");
    std::fs::write(&path, "{ not json").unwrap();

    let mut store = FileStore::open(&path);
    assert_eq!(load_high_score(&store), 0);
    store.set(HIGH_SCORE_KEY, "42").unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.contains("halloweenHighScore"));
    assert_eq!(load_high_score(&FileStore::open(&path)), 42);
}

#[test]
fn unwritable_path_reports_error() {
    let dir = tempdir().unwrap();
    // A directory where the file should be.
    let mut store = FileStore::open(dir.path());
    assert!(store.set(HIGH_SCORE_KEY, "1").is_err());
    assert!(!record_high_score(&mut store, 10));
}

#[test]
fn failed_write_leaves_stored_score_unchanged() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("scores.json");
    let mut store = FileStore::open(&path);
    assert!(record_high_score(&mut store, 300));

    // Swap the file for a directory so the next write fails.
    std::fs::remove_file(&path).unwrap();
    std::fs::create_dir(&path).unwrap();

    assert!(!record_high_score(&mut store, 900));
    assert_eq!(load_high_score(&store), 300);
    assert_eq!(store.get(HIGH_SCORE_KEY).as_deref(), Some("300"));
}

#[test]
fn missing_parent_dir_keeps_score_unsaved() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("gone").join("scores.json");
    let mut store = FileStore::open(&path);

    assert!(!record_high_score(&mut store, 900));
    assert_eq!(load_high_score(&store), 0);
    assert_eq!(load_high_score(&FileStore::open(&path)), 0);
}

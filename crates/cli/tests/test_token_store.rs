#![allow(clippy::unwrap_used)]

use zeeremind_cli::api::{FileTokenStore, MemoryTokenStore, TokenStore};

#[test]
fn file_store_roundtrip() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileTokenStore::in_dir(tmp.path());

    assert_eq!(store.load(), None);
    store.save("  abc.def  \n").unwrap();
    assert_eq!(store.load().as_deref(), Some("abc.def"));
    assert!(store.path().exists());

    store.clear().unwrap();
    assert_eq!(store.load(), None);
    assert!(!store.path().exists());
}

#[test]
fn file_store_creates_parent_dirs() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileTokenStore::new(tmp.path().join("a").join("b").join("token"));
    store.save("t").unwrap();
    assert_eq!(store.load().as_deref(), Some("t"));
}

#[test]
fn file_store_clear_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileTokenStore::in_dir(tmp.path());
    store.clear().unwrap();
    store.clear().unwrap();
}

#[test]
fn blank_file_counts_as_absent() {
    let tmp = tempfile::tempdir().unwrap();
    let store = FileTokenStore::in_dir(tmp.path());
    std::fs::write(store.path(), "   \n").unwrap();
    assert_eq!(store.load(), None);
}

#[test]
fn memory_store() {
    let store = MemoryTokenStore::with_token("x");
    assert_eq!(store.load().as_deref(), Some("x"));
    store.save("y").unwrap();
    assert_eq!(store.load().as_deref(), Some("y"));
    store.clear().unwrap();
    assert_eq!(store.load(), None);
    assert_eq!(MemoryTokenStore::new().load(), None);
}

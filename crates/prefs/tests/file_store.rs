use std::{
    fs,
    path::PathBuf,
    sync::atomic::{AtomicUsize, Ordering},
};

use prefs::{Error, JsonFileStore, PrefsExt, PrefsStore};
use serde_json::json;

static COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Fresh directory under the system temp dir, unique per test.
fn scratch_dir(tag: &str) -> PathBuf {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    let dir = std::env::temp_dir().join(format!(
        "notchdesk-prefs-{}-{}-{}",
        tag,
        std::process::id(),
        n
    ));
    let _ = fs::remove_dir_all(&dir);
    dir
}

#[test]
fn missing_file_is_empty_and_created_on_write() {
    let dir = scratch_dir("create");
    let path = dir.join("nested").join("prefs.json");
    let store = JsonFileStore::open(&path).unwrap();
    assert_eq!(store.path(), path.as_path());
    assert_eq!(store.get("showDesktopName").unwrap(), None);

    store.set("showDesktopName", json!(false)).unwrap();
    assert!(path.exists());

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.get("showDesktopName").unwrap(), Some(json!(false)));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn malformed_file_is_reported() {
    let dir = scratch_dir("malformed");
    fs::create_dir_all(&dir).unwrap();
    let path = dir.join("prefs.json");
    fs::write(&path, "[1, 2, 3]").unwrap();
    assert!(matches!(JsonFileStore::open(&path), Err(Error::Json { .. })));
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(JsonFileStore::open(&path), Err(Error::Json { .. })));
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn reload_reports_external_edits() {
    let dir = scratch_dir("reload");
    let path = dir.join("prefs.json");
    let store = JsonFileStore::open(&path).unwrap();
    store
        .set_typed("desktopNames", &json!({"4": "Mail"}))
        .unwrap();
    store.set("showDesktopName", json!(true)).unwrap();
    let mut rx = store.subscribe();

    // Another process rewrites the file.
    let other = JsonFileStore::open(&path).unwrap();
    other
        .set("desktopNames", json!({"4": "Mail", "9": "Code"}))
        .unwrap();
    other.remove("showDesktopName").unwrap();

    let mut changed = store.reload().unwrap();
    changed.sort();
    assert_eq!(changed, vec!["desktopNames", "showDesktopName"]);
    assert_eq!(rx.try_recv().unwrap(), "desktopNames");
    assert_eq!(rx.try_recv().unwrap(), "showDesktopName");
    assert_eq!(
        store.get("desktopNames").unwrap(),
        Some(json!({"4": "Mail", "9": "Code"}))
    );

    // Nothing changed since the last reload.
    assert!(store.reload().unwrap().is_empty());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn removing_absent_key_does_not_notify() {
    let dir = scratch_dir("remove");
    let store = JsonFileStore::open(dir.join("prefs.json")).unwrap();
    let mut rx = store.subscribe();
    store.remove("desktopNames").unwrap();
    assert!(rx.try_recv().is_err());
    let _ = fs::remove_dir_all(&dir);
}

#[test]
fn failed_write_is_not_cached_or_persisted_later() {
    let dir = scratch_dir("failwrite");
    let path = dir.join("prefs.json");
    let store = JsonFileStore::open(&path).unwrap();
    store.set("desktopNames", json!({"4": "Mail"})).unwrap();
    let mut rx = store.subscribe();

    // A directory in the way of the temporary file makes the write fail.
    let tmp = dir.join("prefs.json.tmp");
    fs::create_dir_all(&tmp).unwrap();
    assert!(matches!(
        store.set("desktopNames", json!({"5": "Unsaved"})),
        Err(Error::Io { .. })
    ));
    assert!(matches!(
        store.remove("desktopNames"),
        Err(Error::Io { .. })
    ));
    assert_eq!(
        store.get("desktopNames").unwrap(),
        Some(json!({"4": "Mail"}))
    );
    assert!(rx.try_recv().is_err());

    // The next successful write of another key does not carry it to disk.
    fs::remove_dir_all(&tmp).unwrap();
    store.set("showDesktopName", json!(false)).unwrap();
    assert_eq!(rx.try_recv().unwrap(), "showDesktopName");
    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(
        reopened.get("desktopNames").unwrap(),
        Some(json!({"4": "Mail"}))
    );
    let _ = fs::remove_dir_all(&dir);
}

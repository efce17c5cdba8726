use crate::db::{BotStateStore, SqliteAliasStore, SqliteSnapshotStore};
use crate::errors::StoreError;
use crate::pipeline::{AliasStore, SnapshotStore};
use crate::state_file::JsonStateFile;
use crate::tests::utils::{date, init_test_db, rec};

#[test]
fn sqlite_snapshot_missing_then_stored() -> Result<(), StoreError> {
    let (_dir, db) = init_test_db();
    let store = SqliteSnapshotStore::new(db);
    let day = date("2026-10-17");

    let before = store.load(day)?;
    assert!(!before.existed);
    assert!(before.records.is_empty());

    store.store(day, &[rec("SHERLOCK", "18:00", "Anna")])?;
    let after = store.load(day)?;
    assert!(after.existed);
    assert_eq!(after.records, vec![rec("SHERLOCK", "18:00", "Anna")]);

    // Other dates are untouched.
    assert!(!store.load(date("2026-10-18"))?.existed);
    Ok(())
}

#[test]
fn sqlite_snapshot_empty_is_still_existing() -> Result<(), StoreError> {
    let (_dir, db) = init_test_db();
    let store = SqliteSnapshotStore::new(db);
    let day = date("2026-10-17");

    store.store(day, &[])?;
    let loaded = store.load(day)?;
    assert!(loaded.existed);
    assert!(loaded.records.is_empty());
    Ok(())
}

#[test]
fn sqlite_snapshot_overwrites_and_lists_recent_dates() -> Result<(), StoreError> {
    let (_dir, db) = init_test_db();
    let store = SqliteSnapshotStore::new(db);

    store.store(date("2026-10-16"), &[rec("FROZEN", "12:00", "Y")])?;
    store.store(date("2026-10-17"), &[rec("BUNKER", "20:00", "Anna")])?;
    store.store(date("2026-10-17"), &[rec("BUNKER", "20:00", "Boris")])?;

    assert_eq!(
        store.load(date("2026-10-17"))?.records,
        vec![rec("BUNKER", "20:00", "Boris")]
    );
    assert_eq!(
        store.recent_dates(10)?,
        vec![date("2026-10-17"), date("2026-10-16")]
    );
    Ok(())
}

#[test]
fn alias_store_set_overwrite_remove() -> Result<(), StoreError> {
    let (_dir, db) = init_test_db();
    let aliases = SqliteAliasStore::new(db);

    aliases.set("anna_k", "Anna")?;
    aliases.set("anna_k", "Anna K")?;
    aliases.set("boris", "Boris")?;

    let map = aliases.load()?;
    assert_eq!(map.get("anna_k").map(String::as_str), Some("Anna K"));
    assert_eq!(map.len(), 2);

    assert!(aliases.remove("boris")?);
    assert!(!aliases.remove("boris")?);
    assert!(!aliases.load()?.contains_key("boris"));
    Ok(())
}

#[test]
fn bot_state_offset_defaults_to_zero() -> Result<(), StoreError> {
    let (_dir, db) = init_test_db();
    let state = BotStateStore::new(db);

    assert_eq!(state.last_update_id()?, 0);
    state.save_last_update_id(41)?;
    state.save_last_update_id(42)?;
    assert_eq!(state.last_update_id()?, 42);
    Ok(())
}

#[test]
fn json_state_file_only_answers_for_its_date() -> Result<(), StoreError> {
    let dir = tempfile::tempdir()?;
    let store = JsonStateFile::new(dir.path().join("state").join("last_state.json"));
    let day = date("2026-10-17");

    assert!(!store.load(day)?.existed);

    store.store(day, &[rec("SHERLOCK", "18:00", "Anna")])?;
    let loaded = store.load(day)?;
    assert!(loaded.existed);
    assert_eq!(loaded.records, vec![rec("SHERLOCK", "18:00", "Anna")]);

    assert!(!store.load(date("2026-10-18"))?.existed);
    Ok(())
}

#[test]
fn json_state_file_reads_legacy_layout() -> Result<(), StoreError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("last_state.json");
    std::fs::write(
        &path,
        r#"{"date": "2026-10-17", "games": [{"game": "FROZEN", "time": "12:00", "responsible": "Ingen"}]}"#,
    )?;

    let loaded = JsonStateFile::new(&path).load(date("2026-10-17"))?;
    assert!(loaded.existed);
    assert_eq!(loaded.records, vec![rec("FROZEN", "12:00", "Ingen")]);
    Ok(())
}

#[test]
fn json_state_file_garbage_counts_as_missing() -> Result<(), StoreError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("last_state.json");
    std::fs::write(&path, "not json")?;

    assert!(!JsonStateFile::new(&path).load(date("2026-10-17"))?.existed);
    Ok(())
}

#[test]
fn json_state_file_replaces_whole_file_and_ignores_stale_temp() -> Result<(), StoreError> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("last_state.json");
    let store = JsonStateFile::new(&path);
    let day = date("2026-10-17");

    store.store(day, &[rec("SHERLOCK", "18:00", "Anna")])?;

    // Leftover from a write that died halfway.
    let temp = dir.path().join("last_state.json.tmp");
    std::fs::write(&temp, "{\"date\": \"2026-10-17\", \"ga")?;
    assert_eq!(store.load(day)?.records, vec![rec("SHERLOCK", "18:00", "Anna")]);

    store.store(day, &[rec("BUNKER", "20:00", "Boris")])?;
    assert_eq!(store.load(day)?.records, vec![rec("BUNKER", "20:00", "Boris")]);
    assert!(!temp.exists());

    let names: Vec<_> = std::fs::read_dir(dir.path())?
        .filter_map(|e| e.ok())
        .map(|e| e.file_name().to_string_lossy().into_owned())
        .collect();
    assert_eq!(names, vec!["last_state.json".to_string()]);
    Ok(())
}

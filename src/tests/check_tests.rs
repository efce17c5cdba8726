use crate::commands::DaySpec;
use crate::db::SqliteAliasStore;
use crate::pipeline::AliasStore;
use crate::run_check;
use crate::tests::utils::{
    date, fake_pipeline, init_test_db, rec, table_row, BrokenAliases, FakeRows, MemorySnapshots,
    RecordingNotifier,
};

const CHAT: i64 = -100;

#[test]
fn check_sends_report_then_stores_snapshot() {
    let (_dir, db) = init_test_db();
    let rows = FakeRows::default();
    let snapshots = MemorySnapshots::default();
    let notifier = RecordingNotifier::default();
    let pipeline = fake_pipeline(&rows, &snapshots);
    let aliases = SqliteAliasStore::new(db);
    aliases.set("anna_k", "Anna").unwrap();
    let day = date("2026-10-17");

    rows.set(vec![table_row("SHERLOCK", "2026-10-17", "18:00", "Anna")]);
    run_check(&pipeline, &aliases, &notifier, CHAT, DaySpec::On(day)).unwrap();

    let sent = notifier.messages();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, CHAT);
    assert_eq!(sent[0].1, "🗓️ Games planned (2026-10-17):\n\n🕵️SHE | 18:00 | @anna_k");
    assert_eq!(snapshots.get(day), Some(vec![rec("SHERLOCK", "18:00", "Anna")]));
}

#[test]
fn check_with_chat_down_stores_nothing_and_retries_report() {
    let (_dir, db) = init_test_db();
    let rows = FakeRows::default();
    let snapshots = MemorySnapshots::default();
    let notifier = RecordingNotifier::default();
    let pipeline = fake_pipeline(&rows, &snapshots);
    let aliases = SqliteAliasStore::new(db);
    let day = date("2026-10-17");

    rows.set(vec![table_row("SHERLOCK", "2026-10-17", "18:00", "Anna")]);
    notifier.unreachable(CHAT, true);
    assert!(run_check(&pipeline, &aliases, &notifier, CHAT, DaySpec::On(day)).is_err());
    assert!(snapshots.get(day).is_none());

    notifier.unreachable(CHAT, false);
    run_check(&pipeline, &aliases, &notifier, CHAT, DaySpec::On(day)).unwrap();

    let sent = notifier.messages();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.starts_with("🗓️ Games planned (2026-10-17)"));
    assert!(snapshots.get(day).is_some());
}

#[test]
fn check_reports_alias_store_failure_to_chat() {
    let rows = FakeRows::default();
    let snapshots = MemorySnapshots::default();
    let notifier = RecordingNotifier::default();
    let pipeline = fake_pipeline(&rows, &snapshots);
    let day = date("2026-10-17");

    rows.set(vec![table_row("SHERLOCK", "2026-10-17", "18:00", "Anna")]);
    let result = run_check(&pipeline, &BrokenAliases, &notifier, CHAT, DaySpec::On(day));

    assert!(result.is_err());
    let sent = notifier.messages();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].1.starts_with("❗️ Script error:"));
    assert!(snapshots.get(day).is_none());
}

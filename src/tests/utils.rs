use crate::db::connection::{init_db, Database};
use crate::domain::{AliasMap, BookingRecord, Normalizer, NormalizerConfig, RawRow, ReportConfig, Reporter};
use crate::errors::StoreError;
use crate::pipeline::{AliasStore, CheckPipeline, Notifier, RowSource, SnapshotStore, StoredSnapshot};
use crate::scraper::ScraperError;
use crate::telegram::TelegramError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

/// Initialize a fresh test DB using the production schema.
/// Keep the `TempDir` alive for as long as the database is used.
pub fn init_test_db() -> (TempDir, Database) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("test.sqlite3");
    let db = Database::new(path.to_string_lossy().into_owned());

    init_db(&db).unwrap_or_else(|e| panic!("Database initialization failed: {e}"));

    (dir, db)
}

pub fn date(raw: &str) -> NaiveDate {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").expect("test date")
}

pub fn rec(game: &str, time: &str, responsible: &str) -> BookingRecord {
    BookingRecord::new(game, time, responsible)
}

/// A full-width table row as the booking page renders it.
pub fn table_row(game: &str, day: &str, time: &str, responsible: &str) -> RawRow {
    let mut row: RawRow = vec![
        game.to_string(),
        format!("{day} (fre)"),
        time.to_string(),
        responsible.to_string(),
    ];
    row.extend((0..5).map(|i| format!("extra {i}")));
    row
}

/// Row source whose rows (or failure) can be swapped between runs.
#[derive(Clone, Default)]
pub struct FakeRows {
    rows: Arc<Mutex<Vec<RawRow>>>,
    fail: Arc<Mutex<bool>>,
}

impl FakeRows {
    pub fn set(&self, rows: Vec<RawRow>) {
        *self.rows.lock().unwrap() = rows;
    }

    pub fn fail(&self, fail: bool) {
        *self.fail.lock().unwrap() = fail;
    }
}

impl RowSource for FakeRows {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, ScraperError> {
        if *self.fail.lock().unwrap() {
            return Err(ScraperError::Network("connection reset".into()));
        }
        Ok(self.rows.lock().unwrap().clone())
    }
}

/// In-memory snapshot store shared between the pipeline and the test.
#[derive(Clone, Default)]
pub struct MemorySnapshots {
    pub inner: Arc<Mutex<HashMap<NaiveDate, Vec<BookingRecord>>>>,
}

impl MemorySnapshots {
    pub fn get(&self, date: NaiveDate) -> Option<Vec<BookingRecord>> {
        self.inner.lock().unwrap().get(&date).cloned()
    }
}

impl SnapshotStore for MemorySnapshots {
    fn load(&self, date: NaiveDate) -> Result<StoredSnapshot, StoreError> {
        Ok(match self.inner.lock().unwrap().get(&date) {
            Some(records) => StoredSnapshot {
                records: records.clone(),
                existed: true,
            },
            None => StoredSnapshot::missing(),
        })
    }

    fn store(&self, date: NaiveDate, records: &[BookingRecord]) -> Result<(), StoreError> {
        self.inner.lock().unwrap().insert(date, records.to_vec());
        Ok(())
    }
}

/// Records every message; chats marked unreachable fail instead.
#[derive(Clone, Default)]
pub struct RecordingNotifier {
    pub sent: Arc<Mutex<Vec<(i64, String, bool)>>>,
    unreachable: Arc<Mutex<Vec<i64>>>,
}

impl RecordingNotifier {
    pub fn messages(&self) -> Vec<(i64, String, bool)> {
        self.sent.lock().unwrap().clone()
    }

    pub fn unreachable(&self, chat_id: i64, down: bool) {
        let mut chats = self.unreachable.lock().unwrap();
        chats.retain(|&c| c != chat_id);
        if down {
            chats.push(chat_id);
        }
    }

    fn record(&self, chat_id: i64, text: &str, markdown: bool) -> Result<(), TelegramError> {
        if self.unreachable.lock().unwrap().contains(&chat_id) {
            return Err(TelegramError::RequestFailed(format!("chat {chat_id} unreachable")));
        }
        self.sent.lock().unwrap().push((chat_id, text.to_string(), markdown));
        Ok(())
    }
}

impl Notifier for RecordingNotifier {
    fn send(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.record(chat_id, text, false)
    }

    fn send_markdown(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.record(chat_id, text, true)
    }
}

/// Alias store whose backing database is gone.
pub struct BrokenAliases;

impl AliasStore for BrokenAliases {
    fn load(&self) -> Result<AliasMap, StoreError> {
        Err(StoreError::ConnectionSlot)
    }

    fn set(&self, _handle: &str, _display_name: &str) -> Result<(), StoreError> {
        Err(StoreError::ConnectionSlot)
    }

    fn remove(&self, _handle: &str) -> Result<bool, StoreError> {
        Err(StoreError::ConnectionSlot)
    }
}

pub fn fake_pipeline(rows: &FakeRows, snapshots: &MemorySnapshots) -> CheckPipeline {
    CheckPipeline::new(
        Box::new(rows.clone()),
        Box::new(snapshots.clone()),
        Normalizer::new(NormalizerConfig::default()),
        Reporter::new(ReportConfig::default()),
    )
}

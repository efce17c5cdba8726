// src/db/snapshots.rs

use crate::db::connection::Database;
use crate::domain::BookingRecord;
use crate::errors::StoreError;
use crate::pipeline::{SnapshotStore, StoredSnapshot};
use chrono::{NaiveDate, Utc};
use rusqlite::{params, OptionalExtension};

/// Snapshots keyed by target date, records stored as a JSON array.
pub struct SqliteSnapshotStore {
    db: Database,
}

impl SqliteSnapshotStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Stored snapshot dates, newest first.
    pub fn recent_dates(&self, limit: usize) -> Result<Vec<NaiveDate>, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT target_date FROM snapshots ORDER BY target_date DESC LIMIT ?1",
            )?;
            let rows = stmt.query_map(params![limit as i64], |row| row.get::<_, NaiveDate>(0))?;

            let mut out = Vec::new();
            for r in rows {
                out.push(r?);
            }
            Ok(out)
        })
    }
}

impl SnapshotStore for SqliteSnapshotStore {
    fn load(&self, date: NaiveDate) -> Result<StoredSnapshot, StoreError> {
        let json: Option<String> = self.db.with_conn(|conn| {
            let json = conn
                .query_row(
                    "SELECT records_json FROM snapshots WHERE target_date = ?1",
                    params![date],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(json)
        })?;

        match json {
            Some(json) => Ok(StoredSnapshot {
                records: serde_json::from_str(&json)?,
                existed: true,
            }),
            None => Ok(StoredSnapshot::missing()),
        }
    }

    fn store(&self, date: NaiveDate, records: &[BookingRecord]) -> Result<(), StoreError> {
        let json = serde_json::to_string(records)?;
        let now = Utc::now().naive_utc();

        self.db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO snapshots (target_date, records_json, observed_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(target_date) DO UPDATE SET
                    records_json = excluded.records_json,
                    observed_at = excluded.observed_at
                "#,
                params![date, json, now],
            )?;
            Ok(())
        })?;

        tracing::debug!(%date, records = records.len(), "snapshot stored");
        Ok(())
    }
}

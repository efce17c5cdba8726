// src/db/bot_state.rs

use crate::db::connection::Database;
use crate::errors::StoreError;
use rusqlite::{params, OptionalExtension};

const UPDATE_OFFSET_KEY: &str = "last_update_id";

/// Bookkeeping for the long-poll loop.
pub struct BotStateStore {
    db: Database,
}

impl BotStateStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Last processed Telegram update id, 0 if none (or garbage) was stored.
    pub fn last_update_id(&self) -> Result<i64, StoreError> {
        let raw: Option<String> = self.db.with_conn(|conn| {
            Ok(conn
                .query_row(
                    "SELECT value FROM bot_state WHERE key = ?1",
                    params![UPDATE_OFFSET_KEY],
                    |row| row.get(0),
                )
                .optional()?)
        })?;

        Ok(raw.and_then(|v| v.trim().parse().ok()).unwrap_or(0))
    }

    pub fn save_last_update_id(&self, id: i64) -> Result<(), StoreError> {
        self.db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO bot_state (key, value) VALUES (?1, ?2)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value
                "#,
                params![UPDATE_OFFSET_KEY, id.to_string()],
            )?;
            Ok(())
        })
    }
}

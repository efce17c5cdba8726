// src/db/aliases.rs

use crate::db::connection::Database;
use crate::domain::AliasMap;
use crate::errors::StoreError;
use crate::pipeline::AliasStore;
use chrono::Utc;
use rusqlite::params;

pub struct SqliteAliasStore {
    db: Database,
}

impl SqliteAliasStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

impl AliasStore for SqliteAliasStore {
    fn load(&self) -> Result<AliasMap, StoreError> {
        self.db.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT handle, display_name FROM aliases")?;
            let rows = stmt.query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })?;

            let mut map = AliasMap::new();
            for r in rows {
                let (handle, name) = r?;
                map.insert(handle, name);
            }
            Ok(map)
        })
    }

    fn set(&self, handle: &str, display_name: &str) -> Result<(), StoreError> {
        let now = Utc::now().naive_utc();
        self.db.with_conn(|conn| {
            conn.execute(
                r#"
                INSERT INTO aliases (handle, display_name, updated_at)
                VALUES (?1, ?2, ?3)
                ON CONFLICT(handle) DO UPDATE SET
                    display_name = excluded.display_name,
                    updated_at = excluded.updated_at
                "#,
                params![handle, display_name, now],
            )?;
            Ok(())
        })
    }

    fn remove(&self, handle: &str) -> Result<bool, StoreError> {
        self.db.with_conn(|conn| {
            let n = conn.execute("DELETE FROM aliases WHERE handle = ?1", params![handle])?;
            Ok(n > 0)
        })
    }
}

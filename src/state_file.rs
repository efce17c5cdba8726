// src/state_file.rs

use crate::domain::BookingRecord;
use crate::errors::StoreError;
use crate::pipeline::{SnapshotStore, StoredSnapshot};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::PathBuf;

/// Single-file snapshot store: `{"date": "YYYY-MM-DD", "games": [...]}`.
///
/// Only one date is kept. Loading any other date reports "did not exist".
pub struct JsonStateFile {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct StateDocument {
    date: NaiveDate,
    #[serde(default)]
    games: Vec<BookingRecord>,
}

impl JsonStateFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn temp_path(&self) -> PathBuf {
        match self.path.file_name() {
            Some(name) => self.path.with_file_name(format!("{}.tmp", name.to_string_lossy())),
            None => self.path.with_extension("tmp"),
        }
    }
}

impl SnapshotStore for JsonStateFile {
    fn load(&self, date: NaiveDate) -> Result<StoredSnapshot, StoreError> {
        let file = match File::open(&self.path) {
            Ok(f) => f,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Ok(StoredSnapshot::missing());
            }
            Err(e) => return Err(e.into()),
        };

        let doc: StateDocument = match serde_json::from_reader(BufReader::new(file)) {
            Ok(doc) => doc,
            Err(e) => {
                // A broken state file means "nothing observed yet", not a failed run.
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring unreadable state file");
                return Ok(StoredSnapshot::missing());
            }
        };

        if doc.date != date {
            tracing::debug!(stored = %doc.date, requested = %date, "state file holds another date");
            return Ok(StoredSnapshot::missing());
        }

        Ok(StoredSnapshot {
            records: doc.games,
            existed: true,
        })
    }

    fn store(&self, date: NaiveDate, records: &[BookingRecord]) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let doc = StateDocument {
            date,
            games: records.to_vec(),
        };

        // Write next to the target, then swap it in.
        let temp_path = self.temp_path();
        let mut writer = BufWriter::new(File::create(&temp_path)?);
        serde_json::to_writer_pretty(&mut writer, &doc)?;
        writer.flush()?;
        writer.get_ref().sync_all()?;
        drop(writer);

        std::fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

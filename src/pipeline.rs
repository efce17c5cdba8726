// src/pipeline.rs

use crate::domain::{
    AliasMap, BookingRecord, Normalizer, RawRow, ReportOutcome, Reporter,
};
use crate::errors::StoreError;
use crate::scraper::ScraperError;
use crate::telegram::TelegramError;
use chrono::NaiveDate;
use std::sync::Mutex;

/// Supplies the raw booking table.
pub trait RowSource: Send + Sync {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, ScraperError>;
}

/// What the store had for a date. `existed` separates "never looked at this
/// date" from "looked, and it was empty".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoredSnapshot {
    pub records: Vec<BookingRecord>,
    pub existed: bool,
}

impl StoredSnapshot {
    pub fn missing() -> Self {
        Self::default()
    }
}

pub trait SnapshotStore: Send + Sync {
    fn load(&self, date: NaiveDate) -> Result<StoredSnapshot, StoreError>;
    fn store(&self, date: NaiveDate, records: &[BookingRecord]) -> Result<(), StoreError>;
}

pub trait AliasStore: Send + Sync {
    fn load(&self) -> Result<AliasMap, StoreError>;
    fn set(&self, handle: &str, display_name: &str) -> Result<(), StoreError>;
    /// Returns whether an alias was actually removed.
    fn remove(&self, handle: &str) -> Result<bool, StoreError>;
}

pub trait Notifier: Send + Sync {
    fn send(&self, chat_id: i64, text: &str) -> Result<(), TelegramError>;

    fn send_markdown(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.send(chat_id, text)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    #[error(transparent)]
    Scrape(#[from] ScraperError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Notify(#[from] TelegramError),
    #[error("check lock poisoned by an earlier panic")]
    Poisoned,
}

/// Result of one check: the decision plus the snapshot that was observed.
#[derive(Debug, Clone)]
pub struct CheckResult {
    pub outcome: ReportOutcome,
    pub current: Vec<BookingRecord>,
    pub persisted: bool,
}

/// fetch -> normalize -> load previous -> reconcile -> deliver -> persist.
///
/// Runs are serialized through `run_lock`; two checks racing on the same
/// stored snapshot would otherwise both report the same change.
pub struct CheckPipeline {
    source: Box<dyn RowSource>,
    snapshots: Box<dyn SnapshotStore>,
    normalizer: Normalizer,
    reporter: Reporter,
    run_lock: Mutex<()>,
}

impl CheckPipeline {
    pub fn new(
        source: Box<dyn RowSource>,
        snapshots: Box<dyn SnapshotStore>,
        normalizer: Normalizer,
        reporter: Reporter,
    ) -> Self {
        Self {
            source,
            snapshots,
            normalizer,
            reporter,
            run_lock: Mutex::new(()),
        }
    }

    /// Reconciles `date` against what was stored before and hands any report
    /// text to `deliver`. The new snapshot is stored only once `deliver`
    /// succeeded; a failed delivery leaves the store as it was so the next
    /// run reports the same change again.
    pub fn run<F>(&self, date: NaiveDate, aliases: &AliasMap, deliver: F) -> Result<CheckResult, PipelineError>
    where
        F: FnOnce(&str) -> Result<(), PipelineError>,
    {
        let _guard = self.run_lock.lock().map_err(|_| PipelineError::Poisoned)?;

        let rows = self.source.fetch_rows()?;
        let current = self.normalizer.normalize(&rows, date);
        let previous = self.snapshots.load(date)?;

        let outcome = self.reporter.reconcile(
            date,
            &current,
            &previous.records,
            previous.existed,
            aliases,
        );

        if let Some(text) = outcome.text() {
            deliver(text)?;
        }

        let persisted = outcome.should_persist();
        if persisted {
            self.snapshots.store(date, &current)?;
        }

        tracing::info!(
            %date,
            bookings = current.len(),
            previous = previous.records.len(),
            previous_existed = previous.existed,
            reported = outcome.text().is_some(),
            "check finished"
        );

        Ok(CheckResult {
            outcome,
            current,
            persisted,
        })
    }
}

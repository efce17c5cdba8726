// src/domain/normalize.rs

use crate::domain::booking::BookingRecord;
use chrono::NaiveDate;

/// Cell texts of one `<tr>`, in column order.
pub type RawRow = Vec<String>;

/// Column layout of the booking table.
///
/// `min_cells` guards against layout drift: a row with fewer cells than the
/// real table has is not a booking row (headers, spacers, footers).
#[derive(Debug, Clone)]
pub struct NormalizerConfig {
    pub min_cells: usize,
    pub activity_cell: usize,
    pub date_cell: usize,
    pub time_cell: usize,
    pub responsible_cell: usize,
}

impl Default for NormalizerConfig {
    fn default() -> Self {
        Self {
            min_cells: 9,
            activity_cell: 0,
            date_cell: 1,
            time_cell: 2,
            responsible_cell: 3,
        }
    }
}

pub struct Normalizer {
    config: NormalizerConfig,
}

impl Normalizer {
    pub fn new(config: NormalizerConfig) -> Self {
        Self { config }
    }

    /// Keeps the rows that belong to `target` and maps them to records.
    /// Anything that doesn't fit is dropped; this is a filter, not a validator.
    pub fn normalize(&self, rows: &[RawRow], target: NaiveDate) -> Vec<BookingRecord> {
        let target = target.format("%Y-%m-%d").to_string();
        let cfg = &self.config;

        let mut records = Vec::new();
        for (idx, row) in rows.iter().enumerate() {
            if row.len() < cfg.min_cells {
                tracing::trace!(row = idx, cells = row.len(), "skipping short row");
                continue;
            }

            let cell = |i: usize| row.get(i).map(|c| c.trim()).unwrap_or("");

            let date: String = cell(cfg.date_cell).chars().take(10).collect();
            if date != target {
                continue;
            }

            records.push(BookingRecord::new(
                cell(cfg.activity_cell),
                cell(cfg.time_cell),
                cell(cfg.responsible_cell),
            ));
        }

        tracing::debug!(
            date = %target,
            rows = rows.len(),
            accepted = records.len(),
            "normalized booking rows"
        );
        records
    }
}

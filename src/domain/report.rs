// src/domain/report.rs

use crate::domain::booking::BookingRecord;
use crate::domain::changes::{compute_delta, Delta, Reassignment};
use crate::domain::mention::{AliasMap, MentionResolver};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const ADDED_HEADER: &str = "➕ New booking(s):";
const CHANGED_HEADER: &str = "🕴️ Game master assigned (changed):";
const REMOVED_HEADER: &str = "❌ Game booking cancelled:";

/// Rendering knobs. Passed in explicitly; nothing here is read from the environment.
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Short activity code (first 3 chars) -> emoji prefix.
    pub emoji: BTreeMap<String, String>,
    pub mentions: MentionResolver,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let emoji = [("SHE", "🕵️"), ("FRO", "⚱️"), ("BNK", "💰"), ("APO", "☣️")]
            .into_iter()
            .map(|(code, glyph)| (code.to_string(), glyph.to_string()))
            .collect();

        Self {
            emoji,
            mentions: MentionResolver::default(),
        }
    }
}

/// What a reconciliation run decided.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    /// Nothing booked and nothing seen before for this date.
    FirstObservationEmpty(String),
    /// First bookings seen for this date: full listing, not a diff.
    FirstObservationFull(String),
    /// Something moved since the stored snapshot.
    Changes { delta: Delta, text: String },
    /// Nothing worth telling anyone.
    NoChangeSuppressed,
}

impl ReportOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            ReportOutcome::FirstObservationEmpty(text)
            | ReportOutcome::FirstObservationFull(text)
            | ReportOutcome::Changes { text, .. } => Some(text),
            ReportOutcome::NoChangeSuppressed => None,
        }
    }

    /// The current snapshot replaces the stored one only when a report went out.
    pub fn should_persist(&self) -> bool {
        !matches!(self, ReportOutcome::NoChangeSuppressed)
    }
}

pub struct Reporter {
    config: ReportConfig,
}

impl Reporter {
    pub fn new(config: ReportConfig) -> Self {
        Self { config }
    }

    /// Compares the current snapshot with the stored one for the same date.
    ///
    /// The order of the checks matters. An empty day that was already
    /// observed stays silent even if it used to have bookings; only the very
    /// first look at a date reports "no games".
    pub fn reconcile(
        &self,
        date: NaiveDate,
        current: &[BookingRecord],
        previous: &[BookingRecord],
        previous_existed: bool,
        aliases: &AliasMap,
    ) -> ReportOutcome {
        let date = date.format("%Y-%m-%d").to_string();

        if current.is_empty() && !previous_existed {
            return ReportOutcome::FirstObservationEmpty(format!("😱 No games planned ({date})"));
        }
        if current.is_empty() {
            return ReportOutcome::NoChangeSuppressed;
        }
        if previous.is_empty() && !previous_existed {
            let lines: Vec<String> = current.iter().map(|r| self.record_line(r, aliases)).collect();
            return ReportOutcome::FirstObservationFull(format!(
                "🗓️ Games planned ({date}):\n\n{}",
                lines.join("\n")
            ));
        }

        let delta = compute_delta(previous, current);
        if delta.is_empty() {
            return ReportOutcome::NoChangeSuppressed;
        }

        let text = format!(
            "📅 Changes in game bookings {date}:\n\n{}",
            self.render_sections(&delta, aliases).join("\n\n")
        );
        ReportOutcome::Changes { delta, text }
    }

    fn render_sections(&self, delta: &Delta, aliases: &AliasMap) -> Vec<String> {
        let mut sections = Vec::new();

        if !delta.added.is_empty() {
            let lines = delta.added.iter().map(|r| self.record_line(r, aliases));
            sections.push(section(ADDED_HEADER, lines));
        }
        if !delta.changed.is_empty() {
            let lines = delta.changed.iter().map(|c| self.reassignment_line(c, aliases));
            sections.push(section(CHANGED_HEADER, lines));
        }
        if !delta.removed.is_empty() {
            let lines = delta.removed.iter().map(|r| self.record_line(r, aliases));
            sections.push(section(REMOVED_HEADER, lines));
        }

        sections
    }

    fn prefix(&self, record: &BookingRecord) -> String {
        let code = record.short_code();
        let emoji = self.config.emoji.get(code).map(String::as_str).unwrap_or("");
        format!("{emoji}{code} | {}", record.time)
    }

    pub fn record_line(&self, record: &BookingRecord, aliases: &AliasMap) -> String {
        let mention = self.config.mentions.resolve(&record.responsible, aliases);
        format!("{} | {mention}", self.prefix(record))
    }

    fn reassignment_line(&self, change: &Reassignment, aliases: &AliasMap) -> String {
        let mentions = &self.config.mentions;
        format!(
            "{} | {} → {}",
            self.prefix(&change.after),
            mentions.resolve(&change.before.responsible, aliases),
            mentions.resolve(&change.after.responsible, aliases),
        )
    }
}

fn section(header: &str, lines: impl Iterator<Item = String>) -> String {
    std::iter::once(header.to_string())
        .chain(lines)
        .collect::<Vec<_>>()
        .join("\n")
}

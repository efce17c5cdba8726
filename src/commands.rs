// src/commands.rs

use crate::pipeline::{AliasStore, CheckPipeline, CheckResult, PipelineError};
use crate::errors::StoreError;
use crate::telegram::TelegramError;
use chrono::{Duration, NaiveDate};
use std::sync::Arc;

pub const HELP_TEXT: &str = "👋 Hello! I'm the game schedule bot.\n\n\
Use\n\
/today to get today's schedule,\n\
/tomorrow to see tomorrow's schedule,\n\
/date YYYY-MM-DD for any other day,\n\
/iam to set your name (e.g. /iam John D),\n\
/whoami to see which name I use for you,\n\
/forgetme to make me forget it.";

pub const UNKNOWN_COMMAND_TEXT: &str =
    "❓ Unknown command. Try /today or /tomorrow or /iam YourName (e.g. /iam John D)";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Today,
    Tomorrow,
    Date(NaiveDate),
    /// `/date` with something that isn't `YYYY-MM-DD`.
    BadDate(String),
    Iam(String),
    /// `/iam` without a name.
    IamUsage,
    WhoAmI,
    ForgetMe,
    Unknown,
}

/// Which day a schedule request is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DaySpec {
    Today,
    Tomorrow,
    On(NaiveDate),
}

impl DaySpec {
    pub fn resolve(self, today: NaiveDate) -> NaiveDate {
        match self {
            DaySpec::Today => today,
            DaySpec::Tomorrow => today + Duration::days(1),
            DaySpec::On(date) => date,
        }
    }

    /// Accepts `today`, `tomorrow` or `YYYY-MM-DD` (CLI form).
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_lowercase().as_str() {
            "" | "today" => Some(DaySpec::Today),
            "tomorrow" => Some(DaySpec::Tomorrow),
            other => parse_iso_date(other).map(DaySpec::On),
        }
    }
}

/// Strict `YYYY-MM-DD`; chrono alone would also take `2026-1-5`.
pub fn parse_iso_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let shape_ok = raw.len() == 10
        && raw
            .char_indices()
            .all(|(i, c)| if i == 4 || i == 7 { c == '-' } else { c.is_ascii_digit() });
    if !shape_ok {
        return None;
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok()
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let (head, rest) = match text.split_once(char::is_whitespace) {
            Some((head, rest)) => (head, rest.trim()),
            None => (text, ""),
        };
        // Group chats send `/today@SomeBot`.
        let name = head.split('@').next().unwrap_or(head);

        match name {
            "/start" | "/help" => Command::Help,
            "/today" => Command::Today,
            "/tomorrow" => Command::Tomorrow,
            "/date" => match parse_iso_date(rest) {
                Some(date) => Command::Date(date),
                None => Command::BadDate(rest.to_string()),
            },
            "/iam" if rest.is_empty() => Command::IamUsage,
            "/iam" => Command::Iam(rest.to_string()),
            "/whoami" => Command::WhoAmI,
            "/forgetme" => Command::ForgetMe,
            _ => Command::Unknown,
        }
    }

    pub fn day(&self) -> Option<DaySpec> {
        match self {
            Command::Today => Some(DaySpec::Today),
            Command::Tomorrow => Some(DaySpec::Tomorrow),
            Command::Date(date) => Some(DaySpec::On(*date)),
            _ => None,
        }
    }
}

/// Sends a schedule report wherever it has to go.
pub type Deliver<'a> = &'a dyn Fn(&str) -> Result<(), TelegramError>;

/// Text for the chat the command came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub text: String,
    /// `text` uses Telegram MarkdownV2.
    pub markdown: bool,
    /// The text is a report that already went out through the `Deliver`
    /// callback; nothing is left to send.
    pub delivered: bool,
}

impl Reply {
    fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            markdown: false,
            delivered: false,
        }
    }
}

pub struct CommandHandler {
    pipeline: Arc<CheckPipeline>,
    aliases: Box<dyn AliasStore>,
}

impl CommandHandler {
    pub fn new(pipeline: Arc<CheckPipeline>, aliases: Box<dyn AliasStore>) -> Self {
        Self { pipeline, aliases }
    }

    /// Runs one command for `username` (Telegram handle, no `@`).
    ///
    /// Schedule reports are handed to `deliver` while the check still holds
    /// its lock; the snapshot is only stored once delivery succeeded.
    pub fn execute(
        &self,
        username: &str,
        command: &Command,
        today: NaiveDate,
        deliver: Deliver<'_>,
    ) -> Result<Reply, StoreError> {
        let reply = match command {
            Command::Help => Reply::plain(HELP_TEXT),
            Command::Unknown => Reply::plain(UNKNOWN_COMMAND_TEXT),
            Command::BadDate(raw) => Reply::plain(format!(
                "⚠️ {raw:?} is not a date. Use /date YYYY-MM-DD (e.g. /date {}).",
                today.format("%Y-%m-%d")
            )),
            Command::IamUsage => Reply::plain("✍️ Tell me your name, e.g. /iam John D"),
            Command::Iam(name) => {
                self.aliases.set(username, name)?;
                tracing::info!(handle = %username, name = %name, "alias set");
                Reply::plain(format!(
                    "✅ Got it, {name}! I will now mention you by this name in schedules."
                ))
            }
            Command::WhoAmI => match self.aliases.load()?.get(username) {
                Some(name) => Reply {
                    text: format!("🪪 You are currently identified as *{}*\\.", escape_markdown(name)),
                    markdown: true,
                    delivered: false,
                },
                None => Reply::plain(
                    "🤷 I don't know who you are yet. Use /iam Your Name to introduce yourself.",
                ),
            },
            Command::ForgetMe => {
                if self.aliases.remove(username)? {
                    tracing::info!(handle = %username, "alias removed");
                    Reply::plain("❌ Your association has been removed.")
                } else {
                    Reply::plain("🤷 I don't have any record of you.")
                }
            }
            Command::Today | Command::Tomorrow | Command::Date(_) => {
                let date = command.day().map(|d| d.resolve(today)).unwrap_or(today);
                tracing::info!(handle = %username, %date, "schedule requested");
                self.schedule_reply(date, deliver)
            }
        };
        Ok(reply)
    }

    fn schedule_reply(&self, date: NaiveDate, deliver: Deliver<'_>) -> Reply {
        match self.run_check(date, deliver) {
            Ok(result) => match result.outcome.text() {
                Some(text) => Reply {
                    text: text.to_string(),
                    markdown: false,
                    delivered: true,
                },
                None => Reply::plain(format!(
                    "🤷 No changes since the last check ({}).",
                    date.format("%Y-%m-%d")
                )),
            },
            Err(e) => {
                tracing::error!(%date, error = %e, "schedule check failed");
                Reply::plain(failure_text(&e))
            }
        }
    }

    fn run_check(&self, date: NaiveDate, deliver: Deliver<'_>) -> Result<CheckResult, PipelineError> {
        let aliases = self.aliases.load()?;
        self.pipeline
            .run(date, &aliases, |text| deliver(text).map_err(PipelineError::from))
    }
}

/// Generic failure notice; the cycle is aborted and nothing was persisted.
pub fn failure_text(err: &PipelineError) -> String {
    format!("❗️ Script error: {err}")
}

/// MarkdownV2 escaping; valid inside entities such as `*bold*` too.
pub fn escape_markdown(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(
            c,
            '_' | '*' | '[' | ']' | '(' | ')' | '~' | '`' | '>' | '#' | '+' | '-' | '=' | '|' | '{' | '}' | '.' | '!' | '\\'
        ) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

// src/bot.rs

use crate::commands::{Command, CommandHandler};
use crate::db::BotStateStore;
use crate::errors::StoreError;
use crate::pipeline::Notifier;
use crate::telegram::{TelegramClient, TelegramError, Update};
use chrono::{Local, NaiveDate};
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum BotError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error(transparent)]
    Telegram(#[from] TelegramError),
}

/// Routes incoming Telegram messages to commands and sends the replies.
pub struct Bot {
    handler: CommandHandler,
    notifier: Arc<dyn Notifier>,
    /// Group chat that also receives every schedule report.
    broadcast_chat: Option<i64>,
}

impl Bot {
    pub fn new(handler: CommandHandler, notifier: Arc<dyn Notifier>, broadcast_chat: Option<i64>) -> Self {
        Self {
            handler,
            notifier,
            broadcast_chat,
        }
    }

    pub fn handle_update(&self, update: &Update) -> Result<(), BotError> {
        self.handle_update_on(update, Local::now().date_naive())
    }

    /// Messages without text or without a sender username are ignored.
    pub fn handle_update_on(&self, update: &Update, today: NaiveDate) -> Result<(), BotError> {
        let Some(message) = &update.message else {
            return Ok(());
        };
        let text = message.text.as_deref().map(str::trim).unwrap_or("");
        let username = message.from.as_ref().and_then(|u| u.username.as_deref());
        let Some(username) = username.filter(|_| !text.is_empty()) else {
            tracing::debug!(update_id = update.update_id, "ignoring update without text or username");
            return Ok(());
        };

        let chat_id = message.chat.id;
        let command = Command::parse(text);
        tracing::debug!(update_id = update.update_id, handle = %username, ?command, "command received");

        let deliver = |report: &str| self.deliver_report(chat_id, report);
        let reply = self.handler.execute(username, &command, today, &deliver)?;

        if reply.delivered {
            return Ok(());
        }
        if reply.markdown {
            self.notifier.send_markdown(chat_id, &reply.text)?;
        } else {
            self.notifier.send(chat_id, &reply.text)?;
        }
        Ok(())
    }

    /// Reports go to the requester and to the group chat, if that's another chat.
    fn deliver_report(&self, chat_id: i64, report: &str) -> Result<(), TelegramError> {
        self.notifier.send(chat_id, report)?;
        if let Some(group) = self.broadcast_chat.filter(|&group| group != chat_id) {
            self.notifier.send(group, report)?;
        }
        Ok(())
    }

    /// Handles one `getUpdates` batch and stores the new offset.
    /// Returns how many updates were seen.
    pub fn poll_once(
        &self,
        client: &TelegramClient,
        state: &BotStateStore,
        timeout_secs: u64,
    ) -> Result<usize, BotError> {
        let last = state.last_update_id()?;
        let updates = client.get_updates(last, timeout_secs)?;
        if updates.is_empty() {
            return Ok(0);
        }

        let mut max_id = last;
        for update in &updates {
            max_id = max_id.max(update.update_id);
            // One bad update must not block the rest of the batch.
            if let Err(e) = self.handle_update(update) {
                tracing::error!(update_id = update.update_id, error = %e, "failed to handle update");
            }
        }

        state.save_last_update_id(max_id)?;
        Ok(updates.len())
    }

    pub fn poll_forever(&self, client: &TelegramClient, state: &BotStateStore, timeout_secs: u64) {
        let mut consecutive_failures = 0u32;

        loop {
            match self.poll_once(client, state, timeout_secs) {
                Ok(n) => {
                    consecutive_failures = 0;
                    if n > 0 {
                        tracing::info!(updates = n, "processed updates");
                    }
                }
                Err(e) => {
                    consecutive_failures += 1;
                    let backoff = Duration::from_secs(u64::from(consecutive_failures.min(6)) * 5);
                    tracing::warn!(error = %e, ?backoff, "polling failed");
                    std::thread::sleep(backoff);
                }
            }
        }
    }
}

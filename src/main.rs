use crate::bot::Bot;
use crate::commands::{failure_text, CommandHandler, DaySpec};
use crate::config::AppConfig;
use crate::db::{init_db, BotStateStore, Database, SqliteAliasStore, SqliteSnapshotStore};
use crate::domain::{Normalizer, Reporter};
use crate::pipeline::{AliasStore, CheckPipeline, Notifier, PipelineError, SnapshotStore};
use crate::router::{handle, AppState};
use crate::scraper::BookingScraper;
use crate::state_file::JsonStateFile;
use crate::telegram::TelegramClient;
use anyhow::Context;
use astra::Server;
use chrono::Local;
use clap::{Parser, Subcommand};
use std::sync::Arc;

mod bot;
mod commands;
mod config;
mod db;
mod domain;
mod errors;
mod pipeline;
mod responses;
mod router;
mod scraper;
mod state_file;
mod telegram;
mod templates;

#[cfg(test)]
mod tests;

#[derive(Debug, Parser)]
#[command(name = "booking_watch", version, about = "Watches the booking table and reports changes to Telegram")]
struct Cli {
    #[command(subcommand)]
    command: Cmd,

    /// Verbose mode (debug logging)
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Debug, Subcommand)]
enum Cmd {
    /// Scrape once, reconcile against the stored snapshot and notify the chat.
    Check {
        /// `today`, `tomorrow` or `YYYY-MM-DD`
        #[arg(default_value = "today")]
        day: String,
    },
    /// Answer bot commands by long-polling getUpdates.
    Poll {
        /// Handle a single batch and exit (cron-friendly).
        #[arg(long)]
        once: bool,
        #[arg(long, default_value_t = 30)]
        timeout: u64,
    },
    /// Serve the webhook and the snapshot pages.
    Serve,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = AppConfig::from_env().context("failed to load configuration")?;

    let db = Database::new(config.database_path.clone());
    init_db(&db).context("database initialization failed")?;

    let telegram = Arc::new(
        TelegramClient::new(&config.telegram_api_base, config.telegram_token.clone())
            .context("failed to build Telegram client")?,
    );
    let pipeline = Arc::new(build_pipeline(&config, &db)?);

    match cli.command {
        Cmd::Check { day } => {
            let chat_id = config.require_chat_id()?;
            let day = DaySpec::parse(&day)
                .with_context(|| format!("expected today, tomorrow or YYYY-MM-DD, got {day:?}"))?;
            let aliases = SqliteAliasStore::new(db.clone());
            run_check(&pipeline, &aliases, telegram.as_ref(), chat_id, day)
        }
        Cmd::Poll { once, timeout } => {
            let bot = build_bot(&config, &db, pipeline, telegram.clone());
            let state = BotStateStore::new(db.clone());
            if once {
                let n = bot.poll_once(&telegram, &state, 0)?;
                tracing::info!(updates = n, "processed updates");
            } else {
                tracing::info!("polling for bot commands");
                bot.poll_forever(&telegram, &state, timeout);
            }
            Ok(())
        }
        Cmd::Serve => serve(&config, &db, pipeline, telegram),
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "info" };

    let filter = tracing_subscriber::EnvFilter::try_from_env("BOOKING_WATCH_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}

fn snapshot_store(config: &AppConfig, db: &Database) -> Box<dyn SnapshotStore> {
    match &config.state_file {
        Some(path) => Box::new(JsonStateFile::new(path.clone())),
        None => Box::new(SqliteSnapshotStore::new(db.clone())),
    }
}

fn build_pipeline(config: &AppConfig, db: &Database) -> anyhow::Result<CheckPipeline> {
    let scraper = BookingScraper::new(config.scraper.clone()).context("failed to build scraper")?;

    Ok(CheckPipeline::new(
        Box::new(scraper),
        snapshot_store(config, db),
        Normalizer::new(config.normalizer.clone()),
        Reporter::new(config.report.clone()),
    ))
}

fn build_bot(
    config: &AppConfig,
    db: &Database,
    pipeline: Arc<CheckPipeline>,
    telegram: Arc<TelegramClient>,
) -> Bot {
    let handler = CommandHandler::new(pipeline, Box::new(SqliteAliasStore::new(db.clone())));
    Bot::new(handler, telegram, config.telegram_chat_id)
}

/// One scheduled cycle. Failures, including a report that could not be
/// delivered, are reported to the chat and abort the cycle; the stored
/// snapshot is left untouched.
fn run_check(
    pipeline: &CheckPipeline,
    aliases: &dyn AliasStore,
    notifier: &dyn Notifier,
    chat_id: i64,
    day: DaySpec,
) -> anyhow::Result<()> {
    let date = day.resolve(Local::now().date_naive());

    let result = aliases
        .load()
        .map_err(PipelineError::from)
        .and_then(|aliases| {
            pipeline.run(date, &aliases, |text| {
                notifier.send(chat_id, text)?;
                println!("{text}");
                Ok(())
            })
        });

    match result {
        Ok(result) => {
            tracing::info!(
                %date,
                bookings = result.current.len(),
                reported = result.outcome.text().is_some(),
                persisted = result.persisted,
                "check cycle done"
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!(%date, error = %e, "check failed");
            notifier.send(chat_id, &failure_text(&e))?;
            Err(e.into())
        }
    }
}

fn serve(
    config: &AppConfig,
    db: &Database,
    pipeline: Arc<CheckPipeline>,
    telegram: Arc<TelegramClient>,
) -> anyhow::Result<()> {
    let state = AppState {
        bot: build_bot(config, db, pipeline, telegram),
        snapshots: snapshot_store(config, db),
        aliases: Box::new(SqliteAliasStore::new(db.clone())),
        history: config
            .state_file
            .is_none()
            .then(|| SqliteSnapshotStore::new(db.clone())),
        mentions: config.report.mentions.clone(),
        webhook_secret: config.webhook_secret.clone(),
    };

    let addr = config.bind_addr;
    tracing::info!(%addr, "starting server");

    let server = Server::bind(&addr).max_workers(8);

    let result = server.serve(move |req, _info| match handle(req, &state) {
        Ok(resp) => resp,
        Err(err) => responses::html_error_response(err),
    });

    if let Err(e) = result {
        tracing::error!(error = %e, "server ended with error");
    }

    tracing::info!("server shut down cleanly");
    Ok(())
}

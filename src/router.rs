use crate::bot::Bot;
use crate::commands::parse_iso_date;
use crate::db::SqliteSnapshotStore;
use crate::domain::{AliasMap, MentionResolver};
use crate::errors::ServerError;
use crate::pipeline::{AliasStore, SnapshotStore};
use crate::responses::{html_response, text_response, ResultResp};
use crate::telegram::Update;
use crate::templates::pages::{snapshot_page, SnapshotRow, SnapshotVm};
use astra::Request;
use chrono::{Local, NaiveDate};

pub const WEBHOOK_PATH: &str = "/telegram/webhook";
const SECRET_HEADER: &str = "X-Telegram-Bot-Api-Secret-Token";

/// Everything a request handler may touch. Shared by all astra workers.
pub struct AppState {
    pub bot: Bot,
    pub snapshots: Box<dyn SnapshotStore>,
    pub aliases: Box<dyn AliasStore>,
    /// Used for the "stored dates" list; absent with the JSON state file.
    pub history: Option<SqliteSnapshotStore>,
    pub mentions: MentionResolver,
    pub webhook_secret: Option<String>,
}

pub fn handle(req: Request, state: &AppState) -> ResultResp {
    let method = req.method().as_str().to_string();
    let path = req.uri().path().to_string();

    match (method.as_str(), path.as_str()) {
        ("GET", "/health") => text_response(200, "ok"),
        ("GET", "/") => snapshot_view(state, Local::now().date_naive()),
        ("GET", p) if p.starts_with("/snapshots/") => {
            let raw = &p["/snapshots/".len()..];
            let date = parse_iso_date(raw)
                .ok_or_else(|| ServerError::BadRequest(format!("not a YYYY-MM-DD date: {raw}")))?;
            snapshot_view(state, date)
        }
        ("POST", WEBHOOK_PATH) => webhook(req, state),
        _ => Err(ServerError::NotFound),
    }
}

fn snapshot_view(state: &AppState, date: NaiveDate) -> ResultResp {
    let stored = state.snapshots.load(date)?;
    let aliases: AliasMap = state.aliases.load()?;
    let recent_dates = match &state.history {
        Some(history) => history.recent_dates(14)?,
        None => Vec::new(),
    };

    let rows = stored
        .records
        .iter()
        .map(|r| SnapshotRow {
            code: r.short_code().to_string(),
            activity: r.activity_code.clone(),
            time: r.time.clone(),
            mention: state.mentions.resolve(&r.responsible, &aliases),
        })
        .collect();

    html_response(snapshot_page(&SnapshotVm {
        date,
        observed: stored.existed,
        rows,
        recent_dates,
    }))
}

/// Telegram retries any non-2xx answer, so once the payload is accepted we
/// answer 200 even if handling the command failed.
fn webhook(mut req: Request, state: &AppState) -> ResultResp {
    if let Some(expected) = &state.webhook_secret {
        let given = req
            .headers()
            .get(SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        if given != expected {
            return Err(ServerError::Unauthorized("bad webhook secret".into()));
        }
    }

    let update: Update = serde_json::from_reader(req.body_mut().reader())
        .map_err(|e| ServerError::BadRequest(format!("invalid update payload: {e}")))?;

    if let Err(e) = state.bot.handle_update(&update) {
        tracing::error!(update_id = update.update_id, error = %e, "webhook update failed");
    }

    text_response(200, "ok")
}

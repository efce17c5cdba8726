// src/telegram/client.rs

use crate::pipeline::Notifier;
use crate::telegram::models::{ApiResponse, Update};
use reqwest::blocking::Client;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_API_BASE: &str = "https://api.telegram.org";

#[derive(Debug, thiserror::Error)]
pub enum TelegramError {
    #[error("Request failed: {0}")]
    RequestFailed(String),
    #[error("API error: {0}")]
    ApiError(String),
    #[error("Invalid API URL: {0}")]
    BadUrl(#[from] url::ParseError),
}

pub struct TelegramClient {
    api_base: Url,
    token: String,
    client: Client,
}

#[derive(Serialize)]
struct SendMessage<'a> {
    chat_id: i64,
    text: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    parse_mode: Option<&'a str>,
}

#[derive(Serialize)]
struct GetUpdates {
    offset: i64,
    timeout: u64,
    allowed_updates: [&'static str; 1],
}

impl TelegramClient {
    pub fn new(api_base: &str, token: String) -> Result<Self, TelegramError> {
        let client = Client::builder()
            // Long polls hold the connection for up to the poll timeout.
            .timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| TelegramError::RequestFailed(e.to_string()))?;

        Ok(Self {
            api_base: Url::parse(api_base)?,
            token,
            client,
        })
    }

    fn method_url(&self, method: &str) -> Result<Url, TelegramError> {
        let mut url = self.api_base.clone();
        url.path_segments_mut()
            .map_err(|_| TelegramError::ApiError(format!("{} cannot be a base URL", self.api_base)))?
            .pop_if_empty()
            .push(&format!("bot{}", self.token))
            .push(method);
        Ok(url)
    }

    fn call<B: Serialize, T: DeserializeOwned>(&self, method: &str, body: &B) -> Result<T, TelegramError> {
        let resp = self
            .client
            .post(self.method_url(method)?)
            .json(body)
            .send()
            // reqwest puts the URL (and with it the token) into its errors.
            .map_err(|e| TelegramError::RequestFailed(e.without_url().to_string()))?;

        let status = resp.status();
        let envelope: ApiResponse<T> = resp
            .json()
            .map_err(|e| TelegramError::ApiError(format!("HTTP {status}: {}", e.without_url())))?;

        match (envelope.ok, envelope.result) {
            (true, Some(result)) => Ok(result),
            _ => Err(TelegramError::ApiError(format!(
                "{method} failed (HTTP {status}): {}",
                envelope.description.unwrap_or_else(|| "no description".to_string())
            ))),
        }
    }

    pub fn send_message(
        &self,
        chat_id: i64,
        text: &str,
        parse_mode: Option<&str>,
    ) -> Result<(), TelegramError> {
        let _: serde_json::Value = self.call(
            "sendMessage",
            &SendMessage {
                chat_id,
                text,
                parse_mode,
            },
        )?;
        Ok(())
    }

    /// Long-polls for updates after `last_update_id`.
    pub fn get_updates(&self, last_update_id: i64, timeout_secs: u64) -> Result<Vec<Update>, TelegramError> {
        self.call(
            "getUpdates",
            &GetUpdates {
                offset: last_update_id + 1,
                timeout: timeout_secs,
                allowed_updates: ["message"],
            },
        )
    }
}

impl Notifier for TelegramClient {
    fn send(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, text, None)
    }

    fn send_markdown(&self, chat_id: i64, text: &str) -> Result<(), TelegramError> {
        self.send_message(chat_id, text, Some("MarkdownV2"))
    }
}

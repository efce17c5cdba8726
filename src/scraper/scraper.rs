// scraper.rs
use crate::domain::RawRow;
use crate::pipeline::RowSource;
use crate::scraper::ScraperError;
use ::scraper::{Html, Selector};
use rand::Rng;
use reqwest::blocking::Client;
use std::time::Duration;

const USER_AGENT: &str =
    "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/121.0 Safari/537.36";

/// Where the booking table lives and how to log in to see it.
#[derive(Debug, Clone)]
pub struct ScraperSettings {
    pub login_url: String,
    pub table_url: String,
    pub email: String,
    pub password: String,
    /// CSS selector for the table rows, e.g. `.table-responsive tr`.
    pub row_selector: String,
    pub timeout: Duration,
    pub max_attempts: u64,
}

pub struct BookingScraper {
    client: Client,
    settings: ScraperSettings,
}

impl BookingScraper {
    pub fn new(settings: ScraperSettings) -> Result<Self, ScraperError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .cookie_store(true)
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        Ok(Self { client, settings })
    }

    /// Logs in and fetches the table page, retrying with backoff.
    pub fn fetch_html(&self) -> Result<String, ScraperError> {
        const MAX_BACKOFF_SECS: u64 = 10;
        const JITTER_MAX_SECS: u64 = 2;

        let mut last_err = None;

        for attempt in 1..=self.settings.max_attempts.max(1) {
            let start = std::time::Instant::now();

            match self.try_fetch_html() {
                Ok(html) => {
                    tracing::info!(attempt, elapsed = ?start.elapsed(), "booking page fetched");
                    return Ok(html);
                }
                // Wrong credentials won't get better by retrying.
                Err(e @ ScraperError::Login(_)) => return Err(e),
                Err(e) => {
                    tracing::warn!(attempt, elapsed = ?start.elapsed(), error = %e, "booking page fetch failed");
                    last_err = Some(e);

                    if attempt < self.settings.max_attempts {
                        let base = std::cmp::min(2 * attempt, MAX_BACKOFF_SECS);
                        let jitter = rand::thread_rng().gen_range(0..=JITTER_MAX_SECS);
                        std::thread::sleep(Duration::from_secs(base + jitter));
                    }
                }
            }
        }

        Err(last_err.unwrap_or_else(|| ScraperError::Network("retry loop failed".into())))
    }

    fn try_fetch_html(&self) -> Result<String, ScraperError> {
        let s = &self.settings;

        let login = self
            .client
            .post(&s.login_url)
            .form(&[("email", s.email.as_str()), ("password", s.password.as_str())])
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = login.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ScraperError::Login(format!("HTTP {status}")));
        }
        if !status.is_success() {
            return Err(ScraperError::Network(format!("login returned HTTP {status}")));
        }

        let resp = self
            .client
            .get(&s.table_url)
            .send()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        let status = resp.status();
        let text = resp
            .text()
            .map_err(|e| ScraperError::Network(e.to_string()))?;

        if !status.is_success() {
            return Err(ScraperError::Network(format!("HTTP {status} for {}", s.table_url)));
        }

        Ok(text)
    }
}

impl RowSource for BookingScraper {
    fn fetch_rows(&self) -> Result<Vec<RawRow>, ScraperError> {
        let html = self.fetch_html()?;
        extract_rows(&html, &self.settings.row_selector)
    }
}

/// Pulls the `<td>` texts of every row matched by `row_selector`.
///
/// Header rows (only `<th>`) come back as empty rows; the normalizer drops them.
/// Fails only when the selector matches nothing at all, which means the page
/// layout changed or the login silently bounced us to another page.
pub fn extract_rows(html: &str, row_selector: &str) -> Result<Vec<RawRow>, ScraperError> {
    let document = Html::parse_document(html);
    let rows = Selector::parse(row_selector).map_err(|e| ScraperError::HtmlParse(e.to_string()))?;
    let cells = Selector::parse("td").map_err(|e| ScraperError::HtmlParse(e.to_string()))?;

    let out: Vec<RawRow> = document
        .select(&rows)
        .map(|tr| {
            tr.select(&cells)
                .map(|td| td.text().collect::<String>().trim().to_string())
                .collect()
        })
        .collect();

    if out.is_empty() {
        return Err(ScraperError::MissingTable);
    }

    tracing::debug!(rows = out.len(), "extracted table rows");
    Ok(out)
}

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Login rejected: {0}")]
    Login(String),
    #[error("HTML parse error: {0}")]
    HtmlParse(String),
    #[error("booking table not found on page")]
    MissingTable,
}

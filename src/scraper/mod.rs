pub mod scraper;
mod scraper_error;

pub use self::scraper::{BookingScraper, ScraperSettings};
pub use self::scraper_error::ScraperError;

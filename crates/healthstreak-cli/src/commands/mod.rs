pub mod achievements;
pub mod activity;
pub mod adherence;
pub mod config;
pub mod streak;
pub mod trend;

use chrono::{Local, NaiveDate};
use healthstreak_core::ValidationError;

/// The given date, or today in local time.
pub fn date_or_today(date: Option<NaiveDate>) -> NaiveDate {
    date.unwrap_or_else(|| Local::now().date_naive())
}

/// Parse a `YYYY-MM-DD` command-line date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|_| ValidationError::InvalidDate {
        value: raw.to_string(),
    })
}

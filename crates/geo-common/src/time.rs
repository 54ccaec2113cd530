//! Date parsing and acquisition time windows.

use chrono::{Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Date format used on the query string and by `/api/today`.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Parse a `YYYY-MM-DD` date.
pub fn parse_date(s: &str) -> Result<NaiveDate, TimeParseError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| TimeParseError::InvalidFormat(s.to_string()))
}

/// Today's date (UTC) formatted as `YYYY-MM-DD`.
pub fn today_iso() -> String {
    Utc::now().date_naive().format(DATE_FORMAT).to_string()
}

/// An inclusive date range used to select satellite acquisitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl TimeWindow {
    /// Window of `days` days ending at `end`: `[end - days, end]`.
    pub fn lookback(end: NaiveDate, days: i64) -> Self {
        Self {
            start: end - Duration::days(days),
            end,
        }
    }

    /// RFC 3339 bounds covering the whole of the first and last day.
    pub fn rfc3339_bounds(&self) -> (String, String) {
        (
            format!("{}T00:00:00Z", self.start.format(DATE_FORMAT)),
            format!("{}T23:59:59Z", self.end.format(DATE_FORMAT)),
        )
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TimeParseError {
    #[error("Invalid date format: {0}. Expected YYYY-MM-DD")]
    InvalidFormat(String),
}

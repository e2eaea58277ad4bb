use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::client::ClientError;

const DATE_FORMAT: &str = "%Y-%m-%d";

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Anything a caller may pass where a day is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum DateInput {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Utc(DateTime<Utc>),
    /// Milliseconds since the Unix epoch.
    Millis(i64),
    Text(String),
}

impl DateInput {
    pub fn to_date(&self) -> Result<NaiveDate, ClientError> {
        match self {
            Self::Date(date) => Ok(*date),
            Self::DateTime(datetime) => Ok(datetime.date()),
            Self::Utc(datetime) => Ok(datetime.date_naive()),
            Self::Millis(millis) => DateTime::<Utc>::from_timestamp_millis(*millis)
                .map(|datetime| datetime.date_naive())
                .ok_or_else(|| ClientError::InvalidDate(millis.to_string())),
            Self::Text(text) => {
                parse_date_text(text).ok_or_else(|| ClientError::InvalidDate(text.clone()))
            }
        }
    }
}

impl From<NaiveDate> for DateInput {
    fn from(date: NaiveDate) -> Self {
        Self::Date(date)
    }
}

impl From<NaiveDateTime> for DateInput {
    fn from(datetime: NaiveDateTime) -> Self {
        Self::DateTime(datetime)
    }
}

impl From<DateTime<Utc>> for DateInput {
    fn from(datetime: DateTime<Utc>) -> Self {
        Self::Utc(datetime)
    }
}

impl From<i64> for DateInput {
    fn from(millis: i64) -> Self {
        Self::Millis(millis)
    }
}

impl From<&str> for DateInput {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<String> for DateInput {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

/// Format a day as `YYYY-MM-DD`, the form the textbook endpoints expect.
///
/// Fails with [`ClientError::InvalidDate`] when the input cannot be read as a date.
pub fn to_iso_date(date: impl Into<DateInput>) -> Result<String, ClientError> {
    Ok(date.into().to_date()?.format(DATE_FORMAT).to_string())
}

/// Read a vendor date or datetime string as a day. Empty or malformed → `None`.
pub fn parse_vendor_date(s: &str) -> Option<NaiveDate> {
    parse_vendor_datetime(s).map(|datetime| datetime.date())
}

/// Read a vendor datetime string. Plain dates are taken at midnight.
pub fn parse_vendor_datetime(s: &str) -> Option<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    DATETIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, DATE_FORMAT)
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

fn parse_date_text(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    parse_vendor_date(text)
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|datetime| datetime.date_naive())
        })
        // Slash dates are month-first.
        .or_else(|| NaiveDate::parse_from_str(text, "%m/%d/%Y").ok())
}

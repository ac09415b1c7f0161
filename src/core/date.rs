//! Normalisation of the date representations found in stored orders
//!
//! Dates arrive in three shapes depending on which client wrote them:
//! a native date, a store timestamp (`{seconds, nanoseconds}`) or a string
//! (ISO-8601 or `dd/mm/yyyy`). [`DateLike`] models all three and
//! [`DateLike::normalize`] is the single conversion point into `DateTime<Utc>`.

use crate::core::locale::ParseError;
use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// Any of the external date representations
///
/// Deserialization is untagged: objects become [`DateLike::StoreTimestamp`],
/// strings that are valid RFC 3339 become [`DateLike::Native`], integers are
/// read as epoch milliseconds and any other string is kept verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DateLike {
    StoreTimestamp {
        #[serde(alias = "_seconds")]
        seconds: i64,
        #[serde(alias = "_nanoseconds", default)]
        nanoseconds: u32,
    },
    Native(DateTime<Utc>),
    EpochMillis(i64),
    IsoString(String),
}

const NAIVE_DATE_TIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y"];

impl DateLike {
    /// Canonical representation written back to the store
    pub fn timestamp(date: &DateTime<Utc>) -> Self {
        DateLike::StoreTimestamp {
            seconds: date.timestamp(),
            nanoseconds: date.timestamp_subsec_nanos(),
        }
    }

    /// Convert to a UTC date, failing on anything unrecognisable
    ///
    /// Strings without an offset are interpreted as UTC.
    pub fn normalize(&self) -> Result<DateTime<Utc>, ParseError> {
        match self {
            DateLike::Native(date) => Ok(*date),
            DateLike::StoreTimestamp {
                seconds,
                nanoseconds,
            } => Utc
                .timestamp_opt(*seconds, *nanoseconds)
                .single()
                .ok_or_else(|| ParseError::InvalidDate(format!("{}s", seconds))),
            DateLike::EpochMillis(millis) => Utc
                .timestamp_millis_opt(*millis)
                .single()
                .ok_or_else(|| ParseError::InvalidDate(format!("{}ms", millis))),
            DateLike::IsoString(raw) => parse_date_string(raw),
        }
    }

    /// Normalize, falling back to `now + 24h` and logging the problem
    pub fn normalize_or_tomorrow(
        value: Option<&DateLike>,
        now: DateTime<Utc>,
        field: &str,
    ) -> DateTime<Utc> {
        let tomorrow = now + Duration::hours(24);
        match value {
            None => tomorrow,
            Some(date) => match date.normalize() {
                Ok(date) => date,
                Err(err) => {
                    tracing::warn!(field = field, error = %err, "unparseable date, defaulting to tomorrow");
                    tomorrow
                }
            },
        }
    }
}

impl From<DateTime<Utc>> for DateLike {
    fn from(date: DateTime<Utc>) -> Self {
        DateLike::timestamp(&date)
    }
}

fn parse_date_string(raw: &str) -> Result<DateTime<Utc>, ParseError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(ParseError::InvalidDate(raw.to_string()));
    }

    if let Ok(date) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(date.with_timezone(&Utc));
    }

    for format in NAIVE_DATE_TIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(naive.and_utc());
        }
    }

    for format in NAIVE_DATE_FORMATS {
        if let Ok(day) = NaiveDate::parse_from_str(trimmed, format) {
            if let Some(naive) = day.and_hms_opt(0, 0, 0) {
                return Ok(naive.and_utc());
            }
        }
    }

    Err(ParseError::InvalidDate(raw.to_string()))
}

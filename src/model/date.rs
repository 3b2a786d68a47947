//! Lenient date handling for the service's `LocalDate` and `LocalDateTime` values.

use anyhow::{bail, Context};
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Deserializer, Serializer};

/// The format used for dates on the wire and in query strings.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parses `YYYY-MM-DD`, or takes the date part of `YYYY-MM-DDTHH:MM:SS[.fff]`.
pub fn parse_date(s: &str) -> crate::Result<NaiveDate> {
    let s = s.trim();
    let date_part = s.split('T').next().unwrap_or(s);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .with_context(|| format!("'{s}' is not a valid date, expected YYYY-MM-DD"))
}

/// Parses `YYYY-MM-DDTHH:MM:SS[.fff]`. A date without a time is taken as midnight.
pub fn parse_date_time(s: &str) -> crate::Result<NaiveDateTime> {
    let s = s.trim();
    if s.is_empty() {
        bail!("An empty string is not a valid date");
    }
    if !s.contains('T') {
        return Ok(parse_date(s)?.and_time(NaiveTime::MIN));
    }
    // Drop fractional seconds, the service sends them inconsistently
    let whole = s.split('.').next().unwrap_or(s);
    NaiveDateTime::parse_from_str(whole, DATE_TIME_FORMAT)
        .with_context(|| format!("'{s}' is not a valid date-time, expected YYYY-MM-DDTHH:MM:SS"))
}

pub fn format_date(date: &NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn format_date_time(date_time: &NaiveDateTime) -> String {
    date_time.format(DATE_TIME_FORMAT).to_string()
}

/// `#[serde(with = "date_only")]` for `NaiveDate` fields.
pub(crate) mod date_only {
    use super::*;

    pub(crate) fn serialize<S>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_date(date))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDate, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_date(&s).map_err(|e| serde::de::Error::custom(format!("{e:#}")))
    }
}

/// `#[serde(with = "date_time")]` for `NaiveDateTime` fields.
pub(crate) mod date_time {
    use super::*;

    pub(crate) fn serialize<S>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format_date_time(value))
    }

    pub(crate) fn deserialize<'de, D>(deserializer: D) -> Result<NaiveDateTime, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_date_time(&s).map_err(|e| serde::de::Error::custom(format!("{e:#}")))
    }
}

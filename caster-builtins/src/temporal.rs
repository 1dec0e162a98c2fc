//! Date/time casters: `datetime`, `timestamp`, `now`.
//!
//! Accepted text forms, tried in order:
//!
//! ```text
//! now                              current time (UTC)
//! 2024-05-01T12:30:00+02:00        RFC 3339
//! Wed, 01 May 2024 12:30:00 +0200  RFC 2822
//! 2024-05-01 12:30:00[.fff]        naive, read as UTC
//! 2024-05-01T12:30:00[.fff]        naive, read as UTC
//! 2024-05-01                       midnight UTC
//! ```
//!
//! Integers are unix timestamps in seconds.
//!
//! This is a fixed grammar, not a natural-language parser. `now` is the only
//! relative word; phrases such as `tomorrow`, `+1 day` or `next monday` fail
//! with an `Underlying` error, as do bare times without a date.

use chrono::{DateTime, FixedOffset, NaiveDateTime, ParseError, TimeZone, Utc};

use caster_core::{CastError, CastErrorKind, Caster, Value, ValueProvider};

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
];

/// Parse one of the accepted text forms.
pub fn parse_datetime(text: &str) -> Result<DateTime<FixedOffset>, ParseError> {
    let text = text.trim();
    if text.eq_ignore_ascii_case("now") {
        return Ok(Utc::now().fixed_offset());
    }

    let mut last_err = match DateTime::parse_from_rfc3339(text) {
        Ok(dt) => return Ok(dt),
        Err(e) => e,
    };
    if let Ok(dt) = DateTime::parse_from_rfc2822(text) {
        return Ok(dt);
    }
    for format in NAIVE_FORMATS {
        match NaiveDateTime::parse_from_str(text, format) {
            Ok(naive) => return Ok(naive.and_utc().fixed_offset()),
            Err(e) => last_err = e,
        }
    }
    NaiveDateTime::parse_from_str(&format!("{text} 00:00:00"), "%Y-%m-%d %H:%M:%S")
        .map(|naive| naive.and_utc().fixed_offset())
        .map_err(|_| last_err)
}

/// Shared by `datetime` and `timestamp`; errors are attributed to `caster`.
fn to_datetime(caster: &str, value: &Value) -> Result<DateTime<FixedOffset>, CastError> {
    match value {
        Value::DateTime(dt) => Ok(*dt),
        Value::String(text) => parse_datetime(text).map_err(|e| {
            CastError::new(CastErrorKind::Underlying, caster, value, "invalid date format").with_source(e)
        }),
        Value::Int(secs) => Utc
            .timestamp_opt(*secs, 0)
            .single()
            .map(|dt| dt.fixed_offset())
            .ok_or_else(|| CastError::invalid(caster, value, "timestamp is out of range")),
        other => Err(CastError::unsupported(caster, other)),
    }
}

// ---------------------------------------------------------------------------
// datetime
// ---------------------------------------------------------------------------

/// Parses dates and unix timestamps into a date-time with offset.
#[derive(Debug, Clone, Copy, Default)]
pub struct DateTimeCaster;

impl DateTimeCaster {
    pub const NAME: &'static str = "datetime";
}

impl Caster for DateTimeCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        to_datetime(Self::NAME, value).map(Value::DateTime)
    }
}

// ---------------------------------------------------------------------------
// timestamp
// ---------------------------------------------------------------------------

/// Parses dates into unix seconds.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimestampCaster;

impl TimestampCaster {
    pub const NAME: &'static str = "timestamp";
}

impl Caster for TimestampCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        to_datetime(Self::NAME, value).map(|dt| Value::Int(dt.timestamp()))
    }
}

// ---------------------------------------------------------------------------
// now
// ---------------------------------------------------------------------------

/// Ignores its input and yields the current UTC time.
#[derive(Debug, Clone, Copy, Default)]
pub struct NowCaster;

impl NowCaster {
    pub const NAME: &'static str = "now";
}

impl ValueProvider for NowCaster {
    fn value(&self) -> Value {
        Value::from(Utc::now())
    }
}

impl Caster for NowCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, _value: &Value) -> Result<Value, CastError> {
        Ok(self.value())
    }
}

//! `byte` caster: human-readable sizes to [`ByteSize`].

use once_cell::sync::Lazy;
use regex::Regex;

use caster_core::{ByteSize, CastError, Caster, Value};

static SIZE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^(\d+(?:\.\d+)?)\s*(?:([kmgtp])i?)?b?$").expect("size pattern compiles")
});

/// Parse `"512"`, `"10 B"`, `"1.5MB"`, `"2 GiB"`, `"4k"`; multiples are binary.
///
/// An `i` is only accepted directly after a unit prefix.
pub fn parse_byte_size(text: &str) -> Option<ByteSize> {
    let caps = SIZE_RE.captures(text.trim())?;
    let number: f64 = caps[1].parse().ok()?;
    let exponent = match caps.get(2) {
        Some(prefix) => {
            let prefix = prefix.as_str().to_ascii_lowercase();
            "kmgtp".find(prefix.as_str())? as i32 + 1
        }
        None => 0,
    };
    from_f64(number * 1024f64.powi(exponent))
}

fn from_f64(bytes: f64) -> Option<ByteSize> {
    // u64::MAX as f64 rounds up to 2^64, hence the exclusive upper bound.
    (bytes.is_finite() && bytes >= 0.0 && bytes < u64::MAX as f64)
        .then(|| ByteSize(bytes.floor() as u64))
}

/// Converts sizes given as byte counts or unit strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteCaster;

impl ByteCaster {
    pub const NAME: &'static str = "byte";
}

impl Caster for ByteCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        let size = match value {
            Value::Size(_) => return Ok(value.clone()),
            Value::Int(i) => u64::try_from(*i).ok().map(ByteSize),
            Value::Float(f) => from_f64(*f),
            Value::String(text) => parse_byte_size(text),
            other => return Err(CastError::type_mismatch("string or number", Self::NAME, other)),
        };
        size.map(Value::Size)
            .ok_or_else(|| CastError::invalid(Self::NAME, value, "not a valid byte size"))
    }
}

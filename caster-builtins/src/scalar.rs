//! Scalar casters: `string`, `int`, `float`, `bool`, `trim`.

use once_cell::sync::Lazy;
use regex::Regex;

use caster_core::{CastError, CastErrorKind, Caster, Value};

use crate::structured::encode_json;

// ---------------------------------------------------------------------------
// Numeric strings
// ---------------------------------------------------------------------------

static NUMERIC_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[+-]?(\d+(\.\d*)?|\.\d+)([eE][+-]?\d+)?$").expect("numeric pattern compiles")
});

/// A number read from a value that may be a numeric string.
#[derive(Debug, Clone, Copy, PartialEq)]
pub(crate) enum Numeric {
    Int(i64),
    Float(f64),
}

impl Numeric {
    fn as_f64(self) -> f64 {
        match self {
            Numeric::Int(i) => i as f64,
            Numeric::Float(f) => f,
        }
    }
}

/// Decimal text with optional sign, fraction and exponent; surrounding
/// whitespace is ignored. `inf`, `nan` and hex are not numeric.
pub(crate) fn parse_numeric(text: &str) -> Option<Numeric> {
    let text = text.trim();
    if !NUMERIC_RE.is_match(text) {
        return None;
    }
    if let Ok(i) = text.parse::<i64>() {
        return Some(Numeric::Int(i));
    }
    text.parse::<f64>().ok().map(Numeric::Float)
}

fn numeric(value: &Value) -> Option<Numeric> {
    match value {
        Value::Int(i) => Some(Numeric::Int(*i)),
        Value::Float(f) => Some(Numeric::Float(*f)),
        Value::String(s) => parse_numeric(s),
        _ => None,
    }
}

fn truncate(f: f64) -> Option<i64> {
    // i64::MAX as f64 rounds up to 2^63, hence the exclusive upper bound.
    if f.is_finite() && f >= i64::MIN as f64 && f < i64::MAX as f64 {
        Some(f.trunc() as i64)
    } else {
        None
    }
}

// ---------------------------------------------------------------------------
// string
// ---------------------------------------------------------------------------

/// Renders any value as text.
///
/// `null` becomes the empty string and booleans become `"1"` / `""`.
/// Arrays and maps are encoded as compact JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct StringCaster;

impl StringCaster {
    pub const NAME: &'static str = "string";
}

impl Caster for StringCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        let text = match value {
            Value::Null => String::new(),
            Value::Bool(true) => "1".to_string(),
            Value::Bool(false) => String::new(),
            Value::Int(i) => i.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) => s.clone(),
            Value::Array(_) | Value::Map(_) => encode_json(Self::NAME, value, false)?,
            Value::DateTime(dt) => dt.to_rfc3339(),
            Value::Uuid(id) => id.to_string(),
            Value::Email(email) => email.to_string(),
            Value::Phone(phone) => phone.to_string(),
            Value::Size(size) => size.to_string(),
        };
        Ok(Value::String(text))
    }
}

// ---------------------------------------------------------------------------
// int / float
// ---------------------------------------------------------------------------

/// Numeric input to an integer; fractions are truncated toward zero.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntCaster;

impl IntCaster {
    pub const NAME: &'static str = "int";
}

impl Caster for IntCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        match numeric(value) {
            Some(Numeric::Int(i)) => Ok(Value::Int(i)),
            Some(Numeric::Float(f)) => truncate(f).map(Value::Int).ok_or_else(|| {
                CastError::new(
                    CastErrorKind::Unsupported,
                    Self::NAME,
                    value,
                    "value is outside the integer range",
                )
            }),
            None => Err(CastError::type_mismatch("numeric", Self::NAME, value)),
        }
    }
}

/// Numeric input to a float.
#[derive(Debug, Clone, Copy, Default)]
pub struct FloatCaster;

impl FloatCaster {
    pub const NAME: &'static str = "float";
}

impl Caster for FloatCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        numeric(value)
            .map(|n| Value::Float(n.as_f64()))
            .ok_or_else(|| CastError::type_mismatch("numeric", Self::NAME, value))
    }
}

// ---------------------------------------------------------------------------
// bool
// ---------------------------------------------------------------------------

const TRUE_WORDS: [&str; 4] = ["1", "true", "yes", "on"];
const FALSE_WORDS: [&str; 4] = ["0", "false", "no", "off"];

/// Truthiness with a word list for strings.
///
/// `yes/on/1/true` and `no/off/0/false` are recognised case-insensitively;
/// any other string is true unless empty. Numbers are true when non-zero,
/// arrays and maps when non-empty, and domain objects always.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoolCaster;

impl BoolCaster {
    pub const NAME: &'static str = "bool";
}

impl Caster for BoolCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        let truth = match value {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(i) => *i != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) => {
                let word = s.trim().to_lowercase();
                if TRUE_WORDS.contains(&word.as_str()) {
                    true
                } else if FALSE_WORDS.contains(&word.as_str()) {
                    false
                } else {
                    !s.is_empty()
                }
            }
            Value::Array(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
            Value::DateTime(_) | Value::Uuid(_) | Value::Email(_) | Value::Phone(_) | Value::Size(_) => {
                true
            }
        };
        Ok(Value::Bool(truth))
    }
}

// ---------------------------------------------------------------------------
// trim
// ---------------------------------------------------------------------------

/// Strips leading and trailing whitespace from strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimCaster;

impl TrimCaster {
    pub const NAME: &'static str = "trim";
}

impl Caster for TrimCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        match value {
            Value::String(s) => Ok(Value::String(s.trim().to_string())),
            other => Err(CastError::type_mismatch("string", Self::NAME, other)),
        }
    }
}

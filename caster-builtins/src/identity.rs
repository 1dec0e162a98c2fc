//! Identifier casters: `email`, `uuid`, `phone`, `slug`.

use once_cell::sync::Lazy;
use regex::Regex;
use uuid::Uuid;

use caster_core::{CastError, Caster, Email, Phone, Value};

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[A-Za-z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?(?:\.[a-z0-9](?:[a-z0-9-]{0,61}[a-z0-9])?)+$",
    )
    .expect("email pattern compiles")
});

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{6,14}$").expect("phone pattern compiles"));

// ---------------------------------------------------------------------------
// email
// ---------------------------------------------------------------------------

/// Validates and normalizes e-mail addresses.
///
/// Surrounding whitespace is removed and the domain is lowercased; the local
/// part keeps its case.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmailCaster;

impl EmailCaster {
    pub const NAME: &'static str = "email";

    pub fn normalize(raw: &str) -> String {
        let raw = raw.trim();
        match raw.rsplit_once('@') {
            Some((local, domain)) => format!("{local}@{}", domain.to_lowercase()),
            None => raw.to_string(),
        }
    }

    pub fn is_valid(address: &str) -> bool {
        let Some((local, _)) = address.rsplit_once('@') else {
            return false;
        };
        address.len() <= 254
            && local.len() <= 64
            && !local.starts_with('.')
            && !local.ends_with('.')
            && !local.contains("..")
            && EMAIL_RE.is_match(address)
    }
}

impl Caster for EmailCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        match value {
            Value::Email(_) => Ok(value.clone()),
            Value::String(raw) => {
                let address = Self::normalize(raw);
                if !Self::is_valid(&address) {
                    return Err(CastError::invalid(Self::NAME, value, "not a valid e-mail address"));
                }
                Ok(Value::Email(Email(address)))
            }
            other => Err(CastError::type_mismatch("string", Self::NAME, other)),
        }
    }
}

// ---------------------------------------------------------------------------
// uuid
// ---------------------------------------------------------------------------

/// Parses UUID text (hyphenated, simple, braced or URN form) or builds one
/// from a non-negative integer.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidCaster;

impl UuidCaster {
    pub const NAME: &'static str = "uuid";
}

impl Caster for UuidCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        match value {
            Value::Uuid(_) => Ok(value.clone()),
            Value::String(text) => Uuid::parse_str(text.trim())
                .map(Value::Uuid)
                .map_err(|e| CastError::invalid(Self::NAME, value, "invalid uuid format").with_source(e)),
            Value::Int(i) => u128::try_from(*i)
                .map(|n| Value::Uuid(Uuid::from_u128(n)))
                .map_err(|_| CastError::invalid(Self::NAME, value, "negative integers have no uuid form")),
            other => Err(CastError::type_mismatch("string, int or uuid", Self::NAME, other)),
        }
    }
}

// ---------------------------------------------------------------------------
// phone
// ---------------------------------------------------------------------------

/// Validates phone numbers in international form.
///
/// Spaces, dashes, dots and parentheses are dropped before checking for an
/// optional `+` followed by 7 to 15 digits.
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneCaster;

impl PhoneCaster {
    pub const NAME: &'static str = "phone";
}

impl Caster for PhoneCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        match value {
            Value::Phone(_) => Ok(value.clone()),
            Value::String(raw) => {
                let compact: String = raw
                    .trim()
                    .chars()
                    .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
                    .collect();
                if !PHONE_RE.is_match(&compact) {
                    return Err(CastError::invalid(Self::NAME, value, "not a valid phone number"));
                }
                Ok(Value::Phone(Phone(compact)))
            }
            other => Err(CastError::type_mismatch("string", Self::NAME, other)),
        }
    }
}

// ---------------------------------------------------------------------------
// slug
// ---------------------------------------------------------------------------

/// Transliterates text to ASCII, lowercases it and joins its alphanumeric
/// runs with `-`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SlugCaster;

impl SlugCaster {
    pub const NAME: &'static str = "slug";

    pub fn slugify(text: &str) -> String {
        let ascii = deunicode::deunicode(text);
        let mut slug = String::with_capacity(ascii.len());
        let mut pending_dash = false;
        for c in ascii.chars().map(|c| c.to_ascii_lowercase()) {
            if c.is_ascii_alphanumeric() {
                if pending_dash && !slug.is_empty() {
                    slug.push('-');
                }
                pending_dash = false;
                slug.push(c);
            } else {
                pending_dash = true;
            }
        }
        slug
    }
}

impl Caster for SlugCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        match value {
            Value::String(text) => Ok(Value::String(Self::slugify(text))),
            other => Err(CastError::type_mismatch("string", Self::NAME, other)),
        }
    }
}

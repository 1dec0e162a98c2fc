//! Structured casters: `array`, `json`, `base64`.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use caster_core::{CastError, CastErrorKind, Caster, Value};

/// Encode `value` as JSON text on behalf of `caster`.
///
/// Unicode and slashes are written unescaped. NaN and infinities have no JSON
/// form and are rejected instead of being written as `null`.
pub(crate) fn encode_json(caster: &str, value: &Value, pretty: bool) -> Result<String, CastError> {
    if value.has_non_finite() {
        return Err(CastError::new(
            CastErrorKind::Unsupported,
            caster,
            value,
            "NaN and infinite floats cannot be encoded as JSON",
        ));
    }
    let json = value.to_json();
    let encoded = if pretty {
        serde_json::to_string_pretty(&json)
    } else {
        serde_json::to_string(&json)
    };
    encoded.map_err(|e| CastError::underlying(caster, value, e))
}

/// Rewrite encoded JSON so it is pure ASCII: non-ASCII characters become
/// `\uXXXX` escapes (UTF-16 surrogate pairs above the BMP) and `/` becomes
/// `\/`.
///
/// Both only occur inside string literals of serde_json output, so the
/// rewrite never touches structure.
fn escape_json(encoded: &str) -> String {
    let mut out = String::with_capacity(encoded.len());
    let mut units = [0u16; 2];
    for c in encoded.chars() {
        match c {
            '/' => out.push_str("\\/"),
            c if c.is_ascii() => out.push(c),
            c => {
                for unit in c.encode_utf16(&mut units) {
                    out.push_str(&format!("\\u{unit:04x}"));
                }
            }
        }
    }
    out
}

// ---------------------------------------------------------------------------
// array
// ---------------------------------------------------------------------------

/// Converts input into an array or map.
///
/// | input        | result                         |
/// |--------------|--------------------------------|
/// | array, map   | unchanged                      |
/// | string       | decoded as a JSON array/object |
/// | null         | `[]`                           |
/// | anything else| `[value]`                      |
#[derive(Debug, Clone, Copy, Default)]
pub struct ArrayCaster;

impl ArrayCaster {
    pub const NAME: &'static str = "array";
}

impl Caster for ArrayCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        match value {
            Value::Array(_) | Value::Map(_) => Ok(value.clone()),
            Value::String(text) => {
                let decoded: serde_json::Value = serde_json::from_str(text)
                    .map_err(|e| CastError::underlying(Self::NAME, value, e))?;
                match decoded {
                    serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
                        Ok(Value::from(decoded))
                    }
                    other => Err(CastError::new(
                        CastErrorKind::Unsupported,
                        Self::NAME,
                        value,
                        format!("JSON document is a scalar ({other}), not an array or object"),
                    )),
                }
            }
            Value::Null => Ok(Value::Array(Vec::new())),
            other => Ok(Value::Array(vec![other.clone()])),
        }
    }
}

// ---------------------------------------------------------------------------
// json
// ---------------------------------------------------------------------------

/// Encoding options fixed when a [`JsonCaster`] is built.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonOptions {
    /// Indent nested structures over multiple lines.
    pub pretty: bool,
    /// Write non-ASCII characters as `\uXXXX` and `/` as `\/`.
    pub escape_unicode: bool,
}

/// Encodes any value as JSON text.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCaster {
    options: JsonOptions,
}

impl JsonCaster {
    pub const NAME: &'static str = "json";

    pub fn new(options: JsonOptions) -> Self {
        JsonCaster { options }
    }

    pub fn options(&self) -> JsonOptions {
        self.options
    }
}

impl Caster for JsonCaster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        let encoded = encode_json(Self::NAME, value, self.options.pretty)?;
        if self.options.escape_unicode {
            return Ok(Value::String(escape_json(&encoded)));
        }
        Ok(Value::String(encoded))
    }
}

// ---------------------------------------------------------------------------
// base64
// ---------------------------------------------------------------------------

/// Encodes a string's UTF-8 bytes with the standard padded alphabet.
#[derive(Debug, Clone, Copy, Default)]
pub struct Base64Caster;

impl Base64Caster {
    pub const NAME: &'static str = "base64";
}

impl Caster for Base64Caster {
    fn name(&self) -> &str {
        Self::NAME
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        match value {
            Value::String(s) => Ok(Value::String(STANDARD.encode(s.as_bytes()))),
            other => Err(CastError::type_mismatch("string", Self::NAME, other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_rejects_nan() {
        let err = encode_json("json", &Value::Float(f64::NAN), false).unwrap_err();
        assert_eq!(err.kind(), &CastErrorKind::Unsupported);
    }

    #[test]
    fn encode_keeps_unicode_and_slashes() {
        let text = encode_json("json", &Value::from("héllo/ü"), false).unwrap();
        assert_eq!(text, "\"héllo/ü\"");
    }

    #[test]
    fn pretty_option_indents() {
        let caster = JsonCaster::new(JsonOptions { pretty: true, ..JsonOptions::default() });
        let map: Value = [("a".to_string(), 1)].into_iter().collect();
        assert_eq!(caster.cast(&map).unwrap(), Value::from("{\n  \"a\": 1\n}"));
    }

    #[test]
    fn escape_json_uses_utf16_units() {
        assert_eq!(escape_json(r#"["é/😀"]"#), r#"["\u00e9\/\ud83d\ude00"]"#);
        assert_eq!(escape_json(r#"{"a":1}"#), r#"{"a":1}"#);
    }

    #[test]
    fn escape_unicode_option_applies_to_keys_and_values() {
        let caster = JsonCaster::new(JsonOptions { escape_unicode: true, ..JsonOptions::default() });
        let map: Value = [("clé".to_string(), "a/b")].into_iter().collect();
        assert_eq!(caster.cast(&map).unwrap(), Value::from(r#"{"cl\u00e9":"a\/b"}"#));
    }
}

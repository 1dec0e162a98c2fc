//! Error types for caster-core.

use std::error::Error as StdError;
use std::fmt;

use thiserror::Error;

use crate::types::Value;

type BoxedSource = Box<dyn StdError + Send + Sync + 'static>;

/// What went wrong inside a caster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CastErrorKind {
    /// The input's shape does not match what the caster requires.
    TypeMismatch { expected: String },
    /// The input type is recognised but no conversion rule applies.
    Unsupported,
    /// The input has the right type but fails validation (bad e-mail, uuid, ...).
    Invalid,
    /// A collaborator (JSON codec, date parser) failed; see [`CastError::source`].
    Underlying,
}

impl fmt::Display for CastErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CastErrorKind::TypeMismatch { .. } => write!(f, "type mismatch"),
            CastErrorKind::Unsupported => write!(f, "unsupported"),
            CastErrorKind::Invalid => write!(f, "invalid"),
            CastErrorKind::Underlying => write!(f, "underlying"),
        }
    }
}

/// A failed conversion, attributed to the caster that produced it.
///
/// Pipes return the failing stage's error unchanged, so [`CastError::caster`]
/// always names the stage that actually failed.
#[derive(Debug, Error)]
#[error("caster '{caster}' failed on {value}: {message}")]
pub struct CastError {
    kind: CastErrorKind,
    caster: String,
    value: String,
    message: String,
    #[source]
    source: Option<BoxedSource>,
}

impl CastError {
    pub fn new(
        kind: CastErrorKind,
        caster: impl Into<String>,
        value: &Value,
        message: impl Into<String>,
    ) -> Self {
        CastError {
            kind,
            caster: caster.into(),
            value: describe(value),
            message: message.into(),
            source: None,
        }
    }

    /// `expected` names the accepted input, e.g. `"string"` or `"numeric"`.
    pub fn type_mismatch(expected: &str, caster: impl Into<String>, value: &Value) -> Self {
        let message = format!(
            "type mismatch: expected {expected}, got {}",
            value.type_name()
        );
        Self::new(
            CastErrorKind::TypeMismatch { expected: expected.to_string() },
            caster,
            value,
            message,
        )
    }

    pub fn unsupported(caster: impl Into<String>, value: &Value) -> Self {
        let message = format!("casting {} is not supported", value.type_name());
        Self::new(CastErrorKind::Unsupported, caster, value, message)
    }

    pub fn invalid(caster: impl Into<String>, value: &Value, message: impl Into<String>) -> Self {
        Self::new(CastErrorKind::Invalid, caster, value, message)
    }

    /// Wrap a collaborator failure; its message becomes this error's message.
    pub fn underlying<E>(caster: impl Into<String>, value: &Value, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        let message = source.to_string();
        Self::new(CastErrorKind::Underlying, caster, value, message).with_source(source)
    }

    /// Attach a cause, keeping the current kind and message.
    pub fn with_source<E>(mut self, source: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.source = Some(Box::new(source));
        self
    }

    pub fn kind(&self) -> &CastErrorKind {
        &self.kind
    }

    /// Name of the caster that failed.
    pub fn caster(&self) -> &str {
        &self.caster
    }

    /// Debug rendering of the offending input.
    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn is_type_mismatch(&self) -> bool {
        matches!(self.kind, CastErrorKind::TypeMismatch { .. })
    }
}

/// Offending values are kept as text; long inputs are cut at 64 characters.
fn describe(value: &Value) -> String {
    const LIMIT: usize = 64;
    let text = format!("{value:?}");
    match text.char_indices().nth(LIMIT) {
        Some((cut, _)) => format!("{}…", &text[..cut]),
        None => text,
    }
}

/// All errors that can arise from provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// A constituent of a composite name is not registered.
    #[error("caster '{constituent}' not found for composite caster '{requested}'")]
    NotFound { constituent: String, requested: String },

    /// A caster name is empty or contains the pipe separator.
    #[error("invalid caster name '{name}': {reason}")]
    InvalidName { name: String, reason: &'static str },

    /// [`crate::CasterProvider::cast`] was asked for an unknown simple name.
    #[error("no caster registered under '{name}'")]
    Unknown { name: String },

    /// A factory bound under `binding` built a caster named `produced`.
    #[error("factory bound as '{binding}' produced a caster named '{produced}'")]
    NameMismatch { binding: String, produced: String },

    /// The resolved caster failed.
    #[error(transparent)]
    Cast(#[from] CastError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_mismatch_message_names_expected_and_actual() {
        let err = CastError::type_mismatch("numeric", "int", &Value::from("abc"));
        assert!(err.is_type_mismatch());
        assert_eq!(err.caster(), "int");
        assert_eq!(err.message(), "type mismatch: expected numeric, got string");
        assert!(err.to_string().contains("caster 'int'"));
        assert!(err.value().contains("abc"));
    }

    #[test]
    fn underlying_keeps_source() {
        let cause = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = CastError::underlying("array", &Value::from("{"), cause);
        assert_eq!(err.kind(), &CastErrorKind::Underlying);
        assert!(StdError::source(&err).is_some());
    }

    #[test]
    fn long_values_are_truncated() {
        let err = CastError::unsupported("x", &Value::from("y".repeat(500)));
        assert!(err.value().chars().count() <= 65);
        assert!(err.value().ends_with('…'));
    }

    #[test]
    fn not_found_names_constituent_and_request() {
        let err = ProviderError::NotFound {
            constituent: "missing".into(),
            requested: "a|missing".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("'missing'"));
        assert!(msg.contains("'a|missing'"));
    }
}

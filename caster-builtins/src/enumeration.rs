//! Configurable enum caster.

use caster_core::{CastError, Caster, Value};

/// One case of an enumeration, optionally backed by a string or int value.
#[derive(Debug, Clone, PartialEq)]
pub struct EnumCase {
    pub name: String,
    pub value: Option<Value>,
}

impl EnumCase {
    /// A case matched by its name.
    pub fn unit(name: impl Into<String>) -> Self {
        EnumCase { name: name.into(), value: None }
    }

    /// A case matched by its backing value.
    pub fn backed(name: impl Into<String>, value: impl Into<Value>) -> Self {
        EnumCase { name: name.into(), value: Some(value.into()) }
    }
}

/// Maps input onto one of a fixed set of cases and yields the case name.
///
/// If any case carries a backing value the enum is *backed* and input is
/// compared against backing values only; otherwise input strings are compared
/// against case names.
#[derive(Debug, Clone)]
pub struct EnumCaster {
    name: String,
    cases: Vec<EnumCase>,
}

impl EnumCaster {
    pub fn new(name: impl Into<String>, cases: Vec<EnumCase>) -> Self {
        EnumCaster { name: name.into(), cases }
    }

    pub fn cases(&self) -> &[EnumCase] {
        &self.cases
    }

    fn is_backed(&self) -> bool {
        self.cases.iter().any(|case| case.value.is_some())
    }

    fn find(&self, value: &Value) -> Option<&EnumCase> {
        if self.is_backed() {
            return self.cases.iter().find(|case| case.value.as_ref() == Some(value));
        }
        let text = value.as_str()?;
        self.cases.iter().find(|case| case.name == text)
    }
}

impl Caster for EnumCaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        if !matches!(value, Value::String(_) | Value::Int(_)) {
            return Err(CastError::type_mismatch("string or int", &self.name, value));
        }
        self.find(value)
            .map(|case| Value::String(case.name.clone()))
            .ok_or_else(|| {
                CastError::invalid(
                    &self.name,
                    value,
                    format!("{value} is not a valid case name or value"),
                )
            })
    }
}

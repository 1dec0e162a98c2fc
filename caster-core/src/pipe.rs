//! [`PipeCaster`]: an ordered chain of casters applied in sequence.

use std::sync::Arc;

use crate::caster::{Caster, PIPE_SEPARATOR};
use crate::error::CastError;
use crate::types::Value;

/// Feeds each stage's output into the next stage.
///
/// The first failing stage ends the run and its error is returned untouched;
/// no partial result is produced. An empty pipe returns its input unchanged.
pub struct PipeCaster {
    name: String,
    stages: Vec<Arc<dyn Caster>>,
}

impl PipeCaster {
    /// Stages are shared, not copied. Order is significant: `trim|int` and
    /// `int|trim` are different pipes.
    pub fn new(stages: Vec<Arc<dyn Caster>>) -> Self {
        let name = stages
            .iter()
            .map(|stage| stage.name())
            .collect::<Vec<_>>()
            .join(&PIPE_SEPARATOR.to_string());
        PipeCaster { name, stages }
    }

    pub fn stages(&self) -> &[Arc<dyn Caster>] {
        &self.stages
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }
}

impl Caster for PipeCaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        let Some((first, rest)) = self.stages.split_first() else {
            return Ok(value.clone());
        };
        let mut current = first.cast(value)?;
        for stage in rest {
            current = stage.cast(&current)?;
        }
        Ok(current)
    }
}

impl std::fmt::Debug for PipeCaster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PipeCaster").field("name", &self.name).finish()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    /// Appends a suffix to strings and counts its calls.
    struct Suffix {
        name: &'static str,
        calls: AtomicUsize,
    }

    impl Suffix {
        fn new(name: &'static str) -> Arc<Self> {
            Arc::new(Suffix { name, calls: AtomicUsize::new(0) })
        }
    }

    impl Caster for Suffix {
        fn name(&self) -> &str {
            self.name
        }

        fn cast(&self, value: &Value) -> Result<Value, CastError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match value {
                Value::String(s) => Ok(Value::String(format!("{s}{}", self.name))),
                other => Err(CastError::type_mismatch("string", self.name, other)),
            }
        }
    }

    struct Fail;

    impl Caster for Fail {
        fn name(&self) -> &str {
            "fail"
        }

        fn cast(&self, value: &Value) -> Result<Value, CastError> {
            Err(CastError::unsupported("fail", value))
        }
    }

    fn stage(name: &'static str) -> Arc<dyn Caster> {
        Suffix::new(name)
    }

    #[test]
    fn name_joins_stage_names_in_order() {
        let pipe = PipeCaster::new(vec![stage("a"), stage("b"), stage("a")]);
        assert_eq!(pipe.name(), "a|b|a");
        assert_eq!(pipe.len(), 3);
    }

    #[test]
    fn stages_apply_left_to_right() {
        let pipe = PipeCaster::new(vec![stage("x"), stage("y")]);
        assert_eq!(pipe.cast(&Value::from(">")).unwrap(), Value::from(">xy"));
    }

    #[test]
    fn first_failure_short_circuits() {
        let after = Suffix::new("after");
        let pipe = PipeCaster::new(vec![Arc::new(Fail) as Arc<dyn Caster>, after.clone() as Arc<dyn Caster>]);
        let err = pipe.cast(&Value::from("v")).unwrap_err();
        assert_eq!(err.caster(), "fail");
        assert_eq!(after.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn empty_pipe_is_identity() {
        let pipe = PipeCaster::new(vec![]);
        assert!(pipe.is_empty());
        assert_eq!(pipe.name(), "");
        assert_eq!(pipe.cast(&Value::Int(3)).unwrap(), Value::Int(3));
    }
}

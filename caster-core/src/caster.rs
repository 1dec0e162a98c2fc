//! The [`Caster`] contract shared by every conversion rule.

use std::fmt;
use std::sync::Arc;

use crate::error::CastError;
use crate::types::Value;

/// Reserved separator between constituent names of a composite caster.
pub const PIPE_SEPARATOR: char = '|';

/// A named unit converting one [`Value`] representation into another.
///
/// Implementations hold no per-call state. Any configuration is fixed at
/// construction, so a resolved caster can be shared behind an [`Arc`] and
/// called from several threads.
pub trait Caster: Send + Sync {
    /// Registry key. Must not contain [`PIPE_SEPARATOR`] unless the caster is
    /// itself a pipe.
    fn name(&self) -> &str;

    /// Convert `value`, or explain why it cannot be converted.
    fn cast(&self, value: &Value) -> Result<Value, CastError>;
}

impl fmt::Debug for dyn Caster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Caster").field("name", &self.name()).finish()
    }
}

impl<C: Caster + ?Sized> Caster for Arc<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        (**self).cast(value)
    }
}

impl<C: Caster + ?Sized> Caster for Box<C> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        (**self).cast(value)
    }
}

/// A source of values that ignores any input, e.g. the current time.
///
/// Casters built on a provider implement [`Caster::cast`] by returning
/// [`ValueProvider::value`] unconditionally.
pub trait ValueProvider {
    fn value(&self) -> Value;
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

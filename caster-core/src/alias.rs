//! [`AliasCaster`]: an existing caster under another simple name.

use std::sync::Arc;

use crate::caster::Caster;
use crate::error::CastError;
use crate::types::Value;

/// Delegates to `inner` under a different name.
///
/// Errors come back from `inner` unchanged, so a failure inside an aliased
/// pipe still names the stage that failed, not the alias.
#[derive(Debug, Clone)]
pub struct AliasCaster {
    name: String,
    inner: Arc<dyn Caster>,
}

impl AliasCaster {
    pub fn new(name: impl Into<String>, inner: Arc<dyn Caster>) -> Self {
        AliasCaster { name: name.into(), inner }
    }

    /// The caster this alias forwards to.
    pub fn target(&self) -> &Arc<dyn Caster> {
        &self.inner
    }
}

impl Caster for AliasCaster {
    fn name(&self) -> &str {
        &self.name
    }

    fn cast(&self, value: &Value) -> Result<Value, CastError> {
        self.inner.cast(value)
    }
}

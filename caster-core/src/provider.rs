//! Name-keyed caster registry with lazy instantiation and pipe resolution.
//!
//! # Lookup rules
//!
//! ```text
//! provide("int")        bound name       -> the bound caster (factory resolved once)
//! provide("port")       alias            -> the alias over its current target
//! provide("trim|int")   contains '|'     -> cached pipe, or a new pipe over the
//!                                           constituents (all must be registered)
//! provide("nope")       unknown, no '|'  -> Ok(None)
//! ```
//!
//! Rebinding a name drops every cached pipe and resolved alias that mentions
//! it, directly or through another alias, so later lookups see the new binding.
//!
//! # Locking
//!
//! One mutex guards the binding table and the pipe cache. Factories run while
//! it is held, so each name is instantiated at most once even under concurrent
//! first lookups. A factory must not call back into its provider.

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use indexmap::IndexMap;
use tracing::{debug, trace};

use crate::alias::AliasCaster;
use crate::caster::{Caster, PIPE_SEPARATOR};
use crate::error::ProviderError;
use crate::pipe::PipeCaster;
use crate::types::Value;

/// Deferred constructor for a caster, run on first lookup.
pub type CasterFactory = Box<dyn Fn() -> Arc<dyn Caster> + Send + Sync>;

enum Binding {
    Bound(Arc<dyn Caster>),
    Unbound(CasterFactory),
    Alias {
        target: String,
        resolved: Option<Arc<dyn Caster>>,
    },
}

#[derive(Default)]
struct Table {
    bindings: IndexMap<String, Binding>,
    pipes: HashMap<String, Arc<dyn Caster>>,
}

/// `true` if `name` is one of the `|`-separated parts of `key`.
fn mentions(key: &str, name: &str) -> bool {
    key.split(PIPE_SEPARATOR).any(|part| part == name)
}

impl Table {
    /// Look up a simple name, instantiating and memoizing a factory or alias
    /// binding.
    fn resolve(&mut self, name: &str) -> Result<Option<Arc<dyn Caster>>, ProviderError> {
        let target = match self.bindings.get_mut(name) {
            None => return Ok(None),
            Some(Binding::Bound(caster)) => return Ok(Some(Arc::clone(caster))),
            Some(Binding::Alias { resolved: Some(caster), .. }) => {
                return Ok(Some(Arc::clone(caster)))
            }
            Some(Binding::Unbound(factory)) => {
                let caster = factory();
                if caster.name() != name {
                    // Left unbound: the factory runs again on the next lookup.
                    return Err(ProviderError::NameMismatch {
                        binding: name.to_string(),
                        produced: caster.name().to_string(),
                    });
                }
                debug!(caster = name, "instantiated caster");
                self.bindings.insert(name.to_string(), Binding::Bound(Arc::clone(&caster)));
                return Ok(Some(caster));
            }
            Some(Binding::Alias { target, resolved: None }) => target.clone(),
        };

        let inner = self
            .lookup(&target)?
            .ok_or_else(|| ProviderError::Unknown { name: target.clone() })?;
        let caster: Arc<dyn Caster> = Arc::new(AliasCaster::new(name, inner));
        debug!(alias = name, target = %target, "resolved alias");
        if let Some(Binding::Alias { resolved, .. }) = self.bindings.get_mut(name) {
            *resolved = Some(Arc::clone(&caster));
        }
        Ok(Some(caster))
    }

    /// Resolve a simple or composite name.
    fn lookup(&mut self, name: &str) -> Result<Option<Arc<dyn Caster>>, ProviderError> {
        if let Some(caster) = self.resolve(name)? {
            return Ok(Some(caster));
        }
        if !name.contains(PIPE_SEPARATOR) {
            return Ok(None);
        }
        if let Some(pipe) = self.pipes.get(name) {
            trace!(pipe = name, "pipe cache hit");
            return Ok(Some(Arc::clone(pipe)));
        }

        let mut stages = Vec::new();
        for part in name.split(PIPE_SEPARATOR) {
            let stage = self.resolve(part)?.ok_or_else(|| ProviderError::NotFound {
                constituent: part.to_string(),
                requested: name.to_string(),
            })?;
            stages.push(stage);
        }

        let pipe: Arc<dyn Caster> = Arc::new(PipeCaster::new(stages));
        debug!(pipe = name, "built pipe caster");
        self.pipes.insert(name.to_string(), Arc::clone(&pipe));
        Ok(Some(pipe))
    }

    /// `true` if resolving `target` would pass through `name`, following
    /// alias targets.
    fn reaches(&self, target: &str, name: &str) -> bool {
        let mut pending: Vec<&str> = target.split(PIPE_SEPARATOR).collect();
        let mut seen = HashSet::new();
        while let Some(part) = pending.pop() {
            if part == name {
                return true;
            }
            if !seen.insert(part) {
                continue;
            }
            if let Some(Binding::Alias { target, .. }) = self.bindings.get(part) {
                pending.extend(target.split(PIPE_SEPARATOR));
            }
        }
        false
    }

    fn bind(&mut self, name: String, binding: Binding) {
        let mut stale = vec![name.clone()];
        while let Some(changed) = stale.pop() {
            self.pipes.retain(|key, _| !mentions(key, &changed));
            for (alias, binding) in self.bindings.iter_mut() {
                if let Binding::Alias { target, resolved } = binding {
                    if resolved.is_some() && mentions(target, &changed) {
                        *resolved = None;
                        stale.push(alias.clone());
                    }
                }
            }
        }
        self.bindings.insert(name, binding);
    }
}

/// A registered name and its caster, if it has been instantiated yet.
#[derive(Debug, Clone)]
pub struct ProviderEntry {
    pub name: String,
    pub caster: Option<Arc<dyn Caster>>,
}

impl ProviderEntry {
    pub fn is_resolved(&self) -> bool {
        self.caster.is_some()
    }
}

// ---------------------------------------------------------------------------
// CasterProvider
// ---------------------------------------------------------------------------

/// Stores casters by name and builds pipes from `a|b|c` names on demand.
///
/// Resolved casters are retained until their name (or a name they depend on)
/// is rebound; repeated lookups of the same name return the same [`Arc`].
#[derive(Default)]
pub struct CasterProvider {
    table: Mutex<Table>,
}

impl CasterProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a provider and [`add`](Self::add) every caster in order.
    pub fn with_casters<I>(casters: I) -> Result<Self, ProviderError>
    where
        I: IntoIterator<Item = Arc<dyn Caster>>,
    {
        let provider = Self::new();
        for caster in casters {
            provider.add(caster)?;
        }
        Ok(provider)
    }

    // -----------------------------------------------------------------------
    // 1. Registration
    // -----------------------------------------------------------------------

    /// Bind `caster` under its own name; an existing binding is replaced.
    ///
    /// Fails only when the name is empty or contains the pipe separator.
    pub fn add(&self, caster: Arc<dyn Caster>) -> Result<(), ProviderError> {
        let name = validate_name(caster.name())?;
        trace!(caster = %name, "binding caster");
        self.table().bind(name, Binding::Bound(caster));
        Ok(())
    }

    /// Bind a factory under `name`; it runs on the first lookup of `name`.
    ///
    /// The factory must produce a caster whose `name()` equals `name`,
    /// otherwise lookups fail with [`ProviderError::NameMismatch`].
    pub fn add_lazy<F>(&self, name: impl Into<String>, factory: F) -> Result<(), ProviderError>
    where
        F: Fn() -> Arc<dyn Caster> + Send + Sync + 'static,
    {
        let name = validate_name(&name.into())?;
        trace!(caster = %name, "binding lazy caster");
        self.table().bind(name, Binding::Unbound(Box::new(factory)));
        Ok(())
    }

    /// Bind `name` to another simple or composite name.
    ///
    /// `target` is resolved now, so unknown names fail here. The alias follows
    /// later rebinding of anything `target` mentions. A target that leads back
    /// to `name` is rejected.
    pub fn add_alias(
        &self,
        name: impl Into<String>,
        target: impl Into<String>,
    ) -> Result<(), ProviderError> {
        let name = validate_name(&name.into())?;
        let target = target.into();
        let mut table = self.table();
        if table.reaches(&target, &name) {
            return Err(ProviderError::InvalidName {
                name,
                reason: "alias target refers back to the alias",
            });
        }
        let inner = table
            .lookup(&target)?
            .ok_or_else(|| ProviderError::Unknown { name: target.clone() })?;
        let caster: Arc<dyn Caster> = Arc::new(AliasCaster::new(name.clone(), inner));
        debug!(alias = %name, target = %target, "binding alias");
        table.bind(name, Binding::Alias { target, resolved: Some(caster) });
        Ok(())
    }

    // -----------------------------------------------------------------------
    // 2. Lookup
    // -----------------------------------------------------------------------

    /// `true` if a simple name is bound. Cached pipes are not reported.
    pub fn has(&self, name: &str) -> bool {
        self.table().bindings.contains_key(name)
    }

    /// Resolve a simple or composite name.
    ///
    /// Returns `Ok(None)` for an unknown simple name and
    /// [`ProviderError::NotFound`] when a composite name refers to an
    /// unregistered constituent.
    pub fn provide(&self, name: &str) -> Result<Option<Arc<dyn Caster>>, ProviderError> {
        self.table().lookup(name)
    }

    /// Resolve `name` and cast `value` with it.
    pub fn cast(&self, name: &str, value: &Value) -> Result<Value, ProviderError> {
        let caster = self
            .provide(name)?
            .ok_or_else(|| ProviderError::Unknown { name: name.to_string() })?;
        Ok(caster.cast(value)?)
    }

    // -----------------------------------------------------------------------
    // 3. Iteration
    // -----------------------------------------------------------------------

    /// Registered simple names in registration order.
    pub fn names(&self) -> Vec<String> {
        self.table().bindings.keys().cloned().collect()
    }

    /// Snapshot of every binding. Factories are not run; unresolved bindings
    /// have `caster: None`.
    pub fn entries(&self) -> Vec<ProviderEntry> {
        self.table()
            .bindings
            .iter()
            .map(|(name, binding)| ProviderEntry {
                name: name.clone(),
                caster: match binding {
                    Binding::Bound(caster) => Some(Arc::clone(caster)),
                    Binding::Unbound(_) => None,
                    Binding::Alias { resolved, .. } => resolved.clone(),
                },
            })
            .collect()
    }

    /// Instantiate every pending binding and return all `(name, caster)` pairs.
    pub fn resolve_all(&self) -> Result<Vec<(String, Arc<dyn Caster>)>, ProviderError> {
        let mut table = self.table();
        let names: Vec<String> = table.bindings.keys().cloned().collect();
        let mut resolved = Vec::with_capacity(names.len());
        for name in names {
            if let Some(caster) = table.resolve(&name)? {
                resolved.push((name, caster));
            }
        }
        Ok(resolved)
    }

    pub fn len(&self) -> usize {
        self.table().bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table().bindings.is_empty()
    }

    fn table(&self) -> MutexGuard<'_, Table> {
        // Every mutation is a single insert/retain, so a poisoned table is still consistent.
        self.table.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for CasterProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CasterProvider").field("names", &self.names()).finish()
    }
}

fn validate_name(name: &str) -> Result<String, ProviderError> {
    if name.is_empty() {
        return Err(ProviderError::InvalidName {
            name: name.to_string(),
            reason: "name must not be empty",
        });
    }
    if name.contains(PIPE_SEPARATOR) {
        return Err(ProviderError::InvalidName {
            name: name.to_string(),
            reason: "name must not contain the pipe separator '|'",
        });
    }
    Ok(name.to_string())
}

// ---------------------------------------------------------------------------
// Unit tests
// ---------------------------------------------------------------------------

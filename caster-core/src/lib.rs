//! Caster core library: value model, caster contract, pipes, provider and errors.
//!
//! Public API surface:
//! - [`types`]: [`Value`] and the domain newtypes it carries
//! - [`caster`]: the [`Caster`] and [`ValueProvider`] traits
//! - [`pipe`]: [`PipeCaster`]
//! - [`alias`]: [`AliasCaster`]
//! - [`provider`]: [`CasterProvider`], lazy bindings and `a|b` resolution
//! - [`error`]: [`CastError`], [`ProviderError`]

pub mod alias;
pub mod caster;
pub mod error;
pub mod pipe;
pub mod provider;
pub mod types;

pub use alias::AliasCaster;
pub use caster::{Caster, ValueProvider, PIPE_SEPARATOR};
pub use error::{CastError, CastErrorKind, ProviderError};
pub use pipe::PipeCaster;
pub use provider::{CasterFactory, CasterProvider, ProviderEntry};
pub use types::{ByteSize, Email, Phone, Value};

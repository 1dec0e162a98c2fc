//! # caster-builtins
//!
//! The built-in conversion rules and the default-seeded provider.
//!
//! | name        | result                                   |
//! |-------------|------------------------------------------|
//! | `array`     | array or map (JSON strings are decoded)  |
//! | `json`      | JSON text                                |
//! | `base64`    | base64 text of a string                  |
//! | `string`    | text                                     |
//! | `int`       | integer from numeric input               |
//! | `float`     | float from numeric input                 |
//! | `bool`      | truthiness, with `yes/no/on/off` words   |
//! | `email`     | validated [`Email`](caster_core::Email)  |
//! | `timestamp` | unix seconds                             |
//! | `datetime`  | date-time with offset                    |
//! | `uuid`      | UUID                                     |
//! | `slug`      | URL slug                                 |
//! | `phone`     | validated [`Phone`](caster_core::Phone)  |
//! | `now`       | current time, input ignored              |
//! | `byte`      | [`ByteSize`](caster_core::ByteSize)      |
//! | `trim`      | string without surrounding whitespace    |
//!
//! ## Usage
//!
//! ```rust
//! use caster_builtins::default_provider;
//! use caster_core::Value;
//!
//! let provider = default_provider();
//! let port = provider.cast("trim|int", &Value::from(" 8080 ")).unwrap();
//! assert_eq!(port, Value::Int(8080));
//! ```

pub mod byte;
pub mod config;
pub mod enumeration;
pub mod identity;
pub mod scalar;
pub mod structured;
pub mod temporal;

use std::sync::Arc;

use caster_core::{Caster, CasterProvider};

pub use caster_core::AliasCaster;
pub use byte::ByteCaster;
pub use config::{load_config, load_config_at, provider_from_config, ConfigError, ProviderConfig};
pub use enumeration::{EnumCase, EnumCaster};
pub use identity::{EmailCaster, PhoneCaster, SlugCaster, UuidCaster};
pub use scalar::{BoolCaster, FloatCaster, IntCaster, StringCaster, TrimCaster};
pub use structured::{ArrayCaster, Base64Caster, JsonCaster, JsonOptions};
pub use temporal::{DateTimeCaster, NowCaster, TimestampCaster};

// ---------------------------------------------------------------------------
// Default caster table
// ---------------------------------------------------------------------------

fn build<C: Caster + Default + 'static>() -> Arc<dyn Caster> {
    Arc::new(C::default())
}

const BUILTINS: &[(&str, fn() -> Arc<dyn Caster>)] = &[
    (ArrayCaster::NAME, build::<ArrayCaster>),
    (JsonCaster::NAME, build::<JsonCaster>),
    (Base64Caster::NAME, build::<Base64Caster>),
    (StringCaster::NAME, build::<StringCaster>),
    (IntCaster::NAME, build::<IntCaster>),
    (FloatCaster::NAME, build::<FloatCaster>),
    (BoolCaster::NAME, build::<BoolCaster>),
    (EmailCaster::NAME, build::<EmailCaster>),
    (TimestampCaster::NAME, build::<TimestampCaster>),
    (DateTimeCaster::NAME, build::<DateTimeCaster>),
    (UuidCaster::NAME, build::<UuidCaster>),
    (SlugCaster::NAME, build::<SlugCaster>),
    (PhoneCaster::NAME, build::<PhoneCaster>),
    (NowCaster::NAME, build::<NowCaster>),
    (ByteCaster::NAME, build::<ByteCaster>),
    (TrimCaster::NAME, build::<TrimCaster>),
];

/// Names of the built-in casters, in registration order.
pub fn builtin_names() -> impl Iterator<Item = &'static str> {
    BUILTINS.iter().map(|(name, _)| *name)
}

/// Seed `provider` with a lazy binding for every built-in caster.
///
/// Existing bindings with the same names are replaced.
pub fn register_builtins(provider: &CasterProvider) {
    for (name, factory) in BUILTINS {
        provider
            .add_lazy(*name, *factory)
            .expect("built-in caster names contain no separator");
    }
}

/// A provider holding every built-in caster, none instantiated yet.
pub fn default_provider() -> CasterProvider {
    let provider = CasterProvider::new();
    register_builtins(&provider);
    provider
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_builtin_factory_matches_its_name() {
        for (name, factory) in BUILTINS {
            assert_eq!(factory().name(), *name);
        }
    }

    #[test]
    fn default_provider_is_lazy() {
        let provider = default_provider();
        assert_eq!(provider.len(), BUILTINS.len());
        assert!(provider.entries().iter().all(|e| !e.is_resolved()));
    }
}

//! End-to-end behaviour of the default provider and YAML configuration.
//!
//! Config tests write into an isolated `TempDir`.

use std::fs;
use std::sync::Arc;

use caster_builtins::{
    builtin_names, default_provider, load_config_at, provider_from_config, ConfigError,
    JsonOptions, ProviderConfig,
};
use caster_core::{CastErrorKind, Caster, ProviderError, Value};
use tempfile::TempDir;

// ---------------------------------------------------------------------------
// Helper
// ---------------------------------------------------------------------------

fn write_config(dir: &TempDir, contents: &str) -> std::path::PathBuf {
    let path = dir.path().join("casters.yaml");
    fs::write(&path, contents).expect("write config");
    path
}

fn cast_error(result: Result<Value, ProviderError>) -> caster_core::CastError {
    match result {
        Err(ProviderError::Cast(err)) => err,
        other => panic!("expected a cast error, got {other:?}"),
    }
}

// ---------------------------------------------------------------------------
// Default provider
// ---------------------------------------------------------------------------

#[test]
fn default_provider_registers_every_builtin_in_order() {
    let provider = default_provider();
    let names: Vec<String> = builtin_names().map(str::to_string).collect();
    assert_eq!(provider.names(), names);
    assert!(provider.has("datetime"));
    assert!(!provider.has("string|int"));
}

#[test]
fn string_then_int_pipe() {
    let provider = default_provider();
    assert_eq!(provider.cast("string|int", &Value::from("42")).unwrap(), Value::Int(42));

    let err = cast_error(provider.cast("string|int", &Value::from("abc")));
    assert_eq!(err.caster(), "int");
    assert!(err.is_type_mismatch());
}

#[test]
fn bool_words_and_empty_string() {
    let provider = default_provider();
    assert_eq!(provider.cast("bool", &Value::from("YES")).unwrap(), Value::Bool(true));
    assert_eq!(provider.cast("bool", &Value::from("")).unwrap(), Value::Bool(false));
}

#[test]
fn json_and_array_round_trip_keeps_key_order() {
    let provider = default_provider();
    let map: Value = [("b".to_string(), 2), ("a".to_string(), 1)].into_iter().collect();

    let text = provider.cast("json", &map).unwrap();
    assert_eq!(text, Value::from(r#"{"b":2,"a":1}"#));
    assert_eq!(provider.cast("json|array", &map).unwrap(), map);
}

#[test]
fn composite_lookup_is_cached() {
    let provider = default_provider();
    let first = provider.provide("trim|slug").unwrap().expect("pipe");
    let second = provider.provide("trim|slug").unwrap().expect("pipe");
    assert!(Arc::ptr_eq(&first, &second));
    assert_eq!(first.name(), "trim|slug");
}

#[test]
fn missing_constituent_is_not_found() {
    let provider = default_provider();
    match provider.provide("trim|missing|int") {
        Err(ProviderError::NotFound { constituent, requested }) => {
            assert_eq!(constituent, "missing");
            assert_eq!(requested, "trim|missing|int");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
}

#[test]
fn timestamp_then_datetime() {
    let provider = default_provider();
    let out = provider.cast("timestamp|datetime", &Value::from("2024-05-01")).unwrap();
    let Value::DateTime(dt) = out else {
        panic!("expected a datetime");
    };
    assert_eq!(dt.timestamp(), 1_714_521_600);
}

#[test]
fn invalid_email_through_trim() {
    let provider = default_provider();
    let err = cast_error(provider.cast("trim|email", &Value::from("  nobody  ")));
    assert_eq!(err.caster(), "email");
    assert_eq!(err.kind(), &CastErrorKind::Invalid);
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

#[test]
fn missing_and_empty_config_files_are_default() {
    let dir = TempDir::new().expect("tempdir");
    let missing = dir.path().join("absent.yaml");
    assert_eq!(load_config_at(&missing).unwrap(), ProviderConfig::default());

    let empty = write_config(&dir, "\n");
    assert_eq!(load_config_at(&empty).unwrap(), ProviderConfig::default());
}

#[test]
fn aliases_are_registered_in_file_order() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(
        &dir,
        "aliases:\n  port: \"trim|int\"\n  flag: \"trim|bool\"\n  ports: \"port|string\"\n",
    );
    let config = load_config_at(&path).unwrap();
    let provider = provider_from_config(&config).unwrap();

    let names = provider.names();
    let tail: Vec<&str> = names[names.len() - 3..].iter().map(String::as_str).collect();
    assert_eq!(tail, ["port", "flag", "ports"]);

    assert_eq!(provider.cast("port", &Value::from(" 8080 ")).unwrap(), Value::Int(8080));
    assert_eq!(provider.cast("flag", &Value::from(" off")).unwrap(), Value::Bool(false));
    assert_eq!(provider.cast("ports", &Value::from("22")).unwrap(), Value::from("22"));
    assert_eq!(provider.cast("port|string", &Value::from("7")).unwrap(), Value::from("7"));
}

#[test]
fn alias_errors_name_the_failing_stage() {
    let config = ProviderConfig {
        aliases: [("port".to_string(), "trim|int".to_string())].into_iter().collect(),
        ..ProviderConfig::default()
    };
    let provider = provider_from_config(&config).unwrap();
    let err = cast_error(provider.cast("port", &Value::from("http")));
    assert_eq!(err.caster(), "int");
}

#[test]
fn alias_follows_a_rebound_constituent() {
    #[derive(Debug)]
    struct Zero;

    impl Caster for Zero {
        fn name(&self) -> &str {
            "int"
        }

        fn cast(&self, _value: &Value) -> Result<Value, caster_core::CastError> {
            Ok(Value::Int(0))
        }
    }

    let config = ProviderConfig {
        aliases: [("port".to_string(), "trim|int".to_string())].into_iter().collect(),
        ..ProviderConfig::default()
    };
    let provider = provider_from_config(&config).unwrap();
    assert_eq!(provider.cast("port", &Value::from(" 80 ")).unwrap(), Value::Int(80));

    provider.add(Arc::new(Zero)).unwrap();
    assert_eq!(provider.cast("trim|int", &Value::from(" 80 ")).unwrap(), Value::Int(0));
    assert_eq!(provider.cast("port", &Value::from(" 80 ")).unwrap(), Value::Int(0));
}

#[test]
fn pretty_json_option() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "json:\n  pretty: true\n");
    let config = load_config_at(&path).unwrap();
    assert_eq!(config.json, JsonOptions { pretty: true, escape_unicode: false });

    let provider = provider_from_config(&config).unwrap();
    let list = Value::Array(vec![Value::Int(1)]);
    assert_eq!(provider.cast("json", &list).unwrap(), Value::from("[\n  1\n]"));
}

#[test]
fn escape_unicode_json_option() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "json:\n  escape_unicode: true\n");
    let provider = provider_from_config(&load_config_at(&path).unwrap()).unwrap();

    let out = provider.cast("json", &Value::from("naïve/😀")).unwrap();
    assert_eq!(out, Value::from(r#""na\u00efve\/\ud83d\ude00""#));
    // `string` keeps its own unescaped encoding.
    let list = Value::Array(vec![Value::from("é")]);
    assert_eq!(provider.cast("string", &list).unwrap(), Value::from(r#"["é"]"#));
}

#[test]
fn alias_to_unknown_target_fails() {
    let config = ProviderConfig {
        aliases: [("when".to_string(), "trim|someday".to_string())].into_iter().collect(),
        ..ProviderConfig::default()
    };
    match provider_from_config(&config) {
        Err(ConfigError::Alias { alias, source: ProviderError::NotFound { constituent, .. } }) => {
            assert_eq!(alias, "when");
            assert_eq!(constituent, "someday");
        }
        other => panic!("expected alias NotFound, got {:?}", other.err()),
    }

    let config = ProviderConfig {
        aliases: [("nothing".to_string(), "missing".to_string())].into_iter().collect(),
        ..ProviderConfig::default()
    };
    assert!(matches!(
        provider_from_config(&config),
        Err(ConfigError::Alias { source: ProviderError::Unknown { .. }, .. })
    ));
}

#[test]
fn alias_name_with_separator_is_rejected() {
    let config = ProviderConfig {
        aliases: [("a|b".to_string(), "int".to_string())].into_iter().collect(),
        ..ProviderConfig::default()
    };
    assert!(matches!(
        provider_from_config(&config),
        Err(ConfigError::Alias { source: ProviderError::InvalidName { .. }, .. })
    ));
}

#[test]
fn malformed_yaml_reports_path() {
    let dir = TempDir::new().expect("tempdir");
    let path = write_config(&dir, "json: [unclosed\n");
    let err = load_config_at(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Parse { .. }));
    assert!(err.to_string().contains("casters.yaml"));
}

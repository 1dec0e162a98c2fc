use std::fs;
use std::path::Path;

use assert_cmd::Command;
use predicates::str::contains;
use tempfile::TempDir;

/// `caster <args...> --config <config>`
fn caster_cmd(config: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("caster"));
    cmd.env_remove("RUST_LOG");
    cmd.args(args).arg("--config").arg(config);
    cmd
}

fn stdout_json(mut cmd: Command) -> serde_json::Value {
    let assert = cmd.assert().success();
    let stdout = String::from_utf8(assert.get_output().stdout.clone()).expect("stdout utf8");
    serde_json::from_str(stdout.trim()).expect("parse stdout json")
}

/// A config path that does not exist, so runs see only the built-in casters.
fn no_config(dir: &TempDir) -> std::path::PathBuf {
    dir.path().join("casters.yaml")
}

#[test]
fn cast_pipe_on_string_argument() {
    let dir = TempDir::new().expect("tempdir");
    let out = stdout_json(caster_cmd(&no_config(&dir), &["cast", "trim|int", " 42 "]));
    assert_eq!(out, serde_json::json!(42));
}

#[test]
fn cast_reads_json_input() {
    let dir = TempDir::new().expect("tempdir");
    let out = stdout_json(
        caster_cmd(&no_config(&dir), &["cast", "json", r#"{"b":1,"a":[true]}"#, "--json"]),
    );
    assert_eq!(out, serde_json::json!(r#"{"b":1,"a":[true]}"#));
}

#[test]
fn cast_reads_value_from_stdin() {
    let dir = TempDir::new().expect("tempdir");
    let mut cmd = caster_cmd(&no_config(&dir), &["cast", "bool"]);
    cmd.write_stdin("YES\n");
    let out = stdout_json(cmd);
    assert_eq!(out, serde_json::json!(true));
}

#[test]
fn cast_failure_exits_nonzero_with_caster_name() {
    let dir = TempDir::new().expect("tempdir");
    caster_cmd(&no_config(&dir), &["cast", "string|int", "abc"])
        .assert()
        .failure()
        .stderr(contains("caster 'int' failed"));
}

#[test]
fn cast_missing_constituent_reports_not_found() {
    let dir = TempDir::new().expect("tempdir");
    caster_cmd(&no_config(&dir), &["cast", "trim|nope", "x"])
        .assert()
        .failure()
        .stderr(contains("caster 'nope' not found for composite caster 'trim|nope'"));
}

#[test]
fn aliases_from_config_are_castable_and_listed() {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("casters.yaml");
    fs::write(&config, "aliases:\n  port: \"trim|int\"\n").expect("write config");

    let out = stdout_json(caster_cmd(&config, &["cast", "port", " 8080"]));
    assert_eq!(out, serde_json::json!(8080));

    let listing = stdout_json(caster_cmd(&config, &["list", "--json"]));
    let entries = listing.as_array().expect("list is an array");
    let port = entries
        .iter()
        .find(|entry| entry["name"] == "port")
        .expect("alias is listed");
    assert_eq!(port["instantiated"], serde_json::json!(true));
    let int = entries.iter().find(|entry| entry["name"] == "int").expect("int listed");
    assert_eq!(int["instantiated"], serde_json::json!(true));
    let slug = entries.iter().find(|entry| entry["name"] == "slug").expect("slug listed");
    assert_eq!(slug["instantiated"], serde_json::json!(false));
}

#[test]
fn malformed_config_fails_with_path() {
    let dir = TempDir::new().expect("tempdir");
    let config = dir.path().join("casters.yaml");
    fs::write(&config, "aliases: [not, a, map]\n").expect("write config");

    caster_cmd(&config, &["list"])
        .assert()
        .failure()
        .stderr(contains("failed to load config"));
}

#[test]
fn list_table_names_builtins() {
    let dir = TempDir::new().expect("tempdir");
    caster_cmd(&no_config(&dir), &["list"])
        .env("NO_COLOR", "1")
        .assert()
        .success()
        .stdout(contains("datetime"))
        .stdout(contains("16 casters"));
}

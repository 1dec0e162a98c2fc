//! `caster cast`: run one value through a caster.

use std::io::Read;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use caster_core::Value;

use super::load_provider;

/// Arguments for `caster cast`.
#[derive(Args, Debug)]
pub struct CastArgs {
    /// Caster name, or a pipe such as `trim|int`.
    pub name: String,

    /// Input value. Read from stdin when omitted.
    pub value: Option<String>,

    /// Parse the input as JSON instead of taking it as a string.
    #[arg(long)]
    pub json: bool,

    /// Path to a casters.yaml file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl CastArgs {
    pub fn run(self) -> Result<()> {
        let provider = load_provider(self.config.as_deref())?;

        let raw = match self.value {
            Some(value) => value,
            None => read_stdin()?,
        };
        let input = if self.json {
            let parsed: serde_json::Value =
                serde_json::from_str(&raw).context("input is not valid JSON")?;
            Value::from(parsed)
        } else {
            Value::String(raw)
        };

        let output = provider
            .cast(&self.name, &input)
            .with_context(|| format!("cast '{}' failed", self.name))?;
        println!("{output}");
        Ok(())
    }
}

fn read_stdin() -> Result<String> {
    let mut buf = String::new();
    std::io::stdin()
        .read_to_string(&mut buf)
        .context("failed to read value from stdin")?;
    let trimmed = buf.strip_suffix('\n').unwrap_or(&buf);
    let trimmed = trimmed.strip_suffix('\r').unwrap_or(trimmed);
    Ok(trimmed.to_string())
}

//! `caster list`: registered casters and whether each is instantiated.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use serde::Serialize;
use tabled::{settings::Style, Table, Tabled};

use caster_core::ProviderEntry;

use super::load_provider;

/// Arguments for `caster list`.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Emit machine-readable JSON.
    #[arg(long)]
    pub json: bool,

    /// Path to a casters.yaml file.
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl ListArgs {
    pub fn run(self) -> Result<()> {
        let provider = load_provider(self.config.as_deref())?;
        let entries = provider.entries();
        if self.json {
            return print_json(&entries);
        }
        print_table(&entries);
        Ok(())
    }
}

#[derive(Serialize)]
struct EntryJson<'a> {
    name: &'a str,
    instantiated: bool,
}

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "name")]
    name: String,
    #[tabled(rename = "state")]
    state: String,
}

fn print_json(entries: &[ProviderEntry]) -> Result<()> {
    let payload: Vec<EntryJson<'_>> = entries
        .iter()
        .map(|entry| EntryJson { name: &entry.name, instantiated: entry.is_resolved() })
        .collect();
    println!(
        "{}",
        serde_json::to_string_pretty(&payload).context("failed to serialize caster list")?
    );
    Ok(())
}

fn print_table(entries: &[ProviderEntry]) {
    if entries.is_empty() {
        println!("No casters registered.");
        return;
    }
    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|entry| EntryRow {
            name: entry.name.clone(),
            state: if entry.is_resolved() {
                "ready".green().to_string()
            } else {
                "lazy".bright_black().to_string()
            },
        })
        .collect();
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{table}");
    println!("{} casters", entries.len());
}

//! caster: apply named value conversions from the command line.
//!
//! # Usage
//!
//! ```text
//! caster cast <NAME> [VALUE] [--json] [--config <PATH>]
//! caster list [--json] [--config <PATH>]
//! ```
//!
//! `NAME` may be a pipe such as `trim|int`. Set `RUST_LOG` or pass
//! `--verbose` to see provider activity on stderr.

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{cast::CastArgs, list::ListArgs};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "caster",
    version,
    about = "Convert values through named casters and caster pipes",
    long_about = None,
)]
struct Cli {
    /// Log provider activity at debug level.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cast a value through a caster or a `a|b|c` pipe.
    Cast(CastArgs),

    /// List registered casters.
    List(ListArgs),
}

fn init_tracing(verbose: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let fallback = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    match cli.command {
        Commands::Cast(args) => args.run(),
        Commands::List(args) => args.run(),
    }
}

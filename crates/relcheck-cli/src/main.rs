//! relcheck - release manifest comparison tool.
//!
//! Compares firmware DB build folders across maturity stages and converts
//! repo manifests between release lines.

use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

mod commands;
mod sink;

/// relcheck - release manifest comparison tool
#[derive(Parser, Debug)]
#[command(name = "relcheck")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare DB folders across maturity stages and emit a report
    Compare(commands::compare::CompareArgs),

    /// Rewrite a manifest's branch references to the next release line
    Convert(commands::convert::ConvertArgs),
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_target(false))
        .with(filter)
        .init();

    match cli.command {
        Commands::Compare(args) => commands::compare::run(&args),
        Commands::Convert(args) => commands::convert::run(&args),
    }
}

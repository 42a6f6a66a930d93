//! The `compare` subcommand.
//!
//! Runs the orchestrator over a source tree and writes the multi-sheet
//! report. Exit code is 0 whenever the run completes; the presence of
//! differences is never encoded in the exit code.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use relcheck_core::mapping::{MappingRow, MappingTable};
use relcheck_core::report::ReportSink;
use relcheck_core::{CompareConfig, CompareScenario, FsSourceTree, Orchestrator};
use tracing::info;

use crate::sink::{json::JsonSink, xlsx::XlsxSink};

/// Report output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Format {
    /// Styled spreadsheet.
    Xlsx,
    /// Machine-readable JSON.
    Json,
}

/// Arguments for `relcheck compare`.
#[derive(Args, Debug)]
pub struct CompareArgs {
    /// Root of the source tree (module folders at the top level)
    #[arg(long)]
    pub source_dir: PathBuf,

    /// Where to write the report artifact
    #[arg(long)]
    pub output_path: PathBuf,

    /// Mapping table (JSON) enumerating folder pairs, or "none" to pair
    /// folders by suffix convention
    #[arg(long, default_value = "none")]
    pub mapping: String,

    /// Scenario to run: master_vs_premp, premp_vs_wave, wave_vs_backup, all
    #[arg(long, default_value = "all")]
    pub scenario: String,

    /// Rule-table override file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Report format
    #[arg(long, value_enum, default_value_t = Format::Xlsx)]
    pub format: Format,
}

/// Run the comparison and write the report.
pub fn run(args: &CompareArgs) -> Result<()> {
    let config = load_config(args.config.as_deref())?;
    let scenarios = parse_scenarios(&args.scenario)?;
    let mapping = load_mapping(&args.mapping)?;

    let tree = FsSourceTree::new(&args.source_dir);
    let orchestrator = Orchestrator::new(&tree, &config);
    let report = orchestrator
        .run(&scenarios, mapping.as_ref())
        .context("comparison run failed")?;

    info!(
        revision_diff = report.revision_diff.len(),
        branch_error = report.branch_error.len(),
        lost_project = report.lost_project.len(),
        version_diff = report.version_diff.len(),
        cannot_compare = report.cannot_compare.len(),
        "comparison complete"
    );

    match args.format {
        Format::Xlsx => XlsxSink::new(&args.output_path)
            .write(&report)
            .context("failed to write xlsx report")?,
        Format::Json => JsonSink::new(&args.output_path)
            .write(&report)
            .context("failed to write json report")?,
    }

    for row in &report.summary {
        println!(
            "{}: {} ok, {} failed",
            row.scenario, row.success_count, row.failure_count
        );
    }
    println!("report written to {}", args.output_path.display());
    Ok(())
}

fn load_config(path: Option<&std::path::Path>) -> Result<CompareConfig> {
    match path {
        Some(path) => CompareConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(CompareConfig::default()),
    }
}

fn parse_scenarios(value: &str) -> Result<Vec<CompareScenario>> {
    if value == "all" {
        return Ok(CompareScenario::ALL.to_vec());
    }
    match value.parse::<CompareScenario>() {
        Ok(scenario) => Ok(vec![scenario]),
        Err(e) => bail!("{e} (expected master_vs_premp, premp_vs_wave, wave_vs_backup, or all)"),
    }
}

fn load_mapping(value: &str) -> Result<Option<MappingTable>> {
    if value == "none" {
        return Ok(None);
    }
    let content = std::fs::read_to_string(value)
        .with_context(|| format!("failed to read mapping table {value}"))?;
    let rows: Vec<MappingRow> = serde_json::from_str(&content)
        .with_context(|| format!("failed to parse mapping table {value}"))?;
    Ok(Some(MappingTable { rows }))
}

//! The `convert` subcommand.
//!
//! Rewrites a manifest's branch references for a conversion direction and
//! optionally validates the result against a known-good target manifest.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use relcheck_core::{convert_manifest, validate_conversion, CompareConfig, ConvertScenario};
use tracing::info;

/// Arguments for `relcheck convert`.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Manifest to convert
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the converted manifest
    #[arg(long)]
    pub output: PathBuf,

    /// Conversion direction: master_to_premp, premp_to_mp, mp_to_mpbackup
    #[arg(long)]
    pub scenario: String,

    /// Known-good target manifest to validate the conversion against
    #[arg(long)]
    pub target: Option<PathBuf>,

    /// Rule-table override file (TOML)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Run the conversion.
pub fn run(args: &ConvertArgs) -> Result<()> {
    let config = match &args.config {
        Some(path) => CompareConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => CompareConfig::default(),
    };
    let Ok(scenario) = args.scenario.parse::<ConvertScenario>() else {
        bail!(
            "unknown conversion '{}' (expected master_to_premp, premp_to_mp, mp_to_mpbackup)",
            args.scenario
        );
    };

    let content = std::fs::read_to_string(&args.input)
        .with_context(|| format!("failed to read {}", args.input.display()))?;
    let converted = convert_manifest(&content, scenario, &config)
        .with_context(|| format!("failed to convert {}", args.input.display()))?;
    std::fs::write(&args.output, &converted.xml)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        rewritten = converted.rewritten,
        skipped = converted.skipped,
        "conversion complete"
    );
    println!(
        "converted {} references ({} unchanged) -> {}",
        converted.rewritten,
        converted.skipped,
        args.output.display()
    );

    if let Some(target) = &args.target {
        let target_content = std::fs::read_to_string(target)
            .with_context(|| format!("failed to read {}", target.display()))?;
        let rows = validate_conversion(&converted.xml, &target_content, None)
            .context("validation failed")?;
        let mismatches = rows.iter().filter(|r| !r.matches).count();
        println!("validation against {}:", target.display());
        for row in rows.iter().filter(|r| !r.matches) {
            println!(
                "  {} ({}) converted={} target={} exists={}",
                row.name, row.path, row.converted_revision, row.target_revision, row.exists
            );
        }
        println!("{} project(s) differ from target", mismatches);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_round_trip_through_files() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("manifest.xml");
        let output = dir.path().join("converted.xml");
        std::fs::write(
            &input,
            r#"<manifest>
  <project name="a" path="p" revision="realtek/master" remote="rtk" />
</manifest>"#,
        )
        .unwrap();

        let args = ConvertArgs {
            input,
            output: output.clone(),
            scenario: "master_to_premp".to_string(),
            target: None,
            config: None,
        };
        run(&args).unwrap();

        let converted = std::fs::read_to_string(output).unwrap();
        assert!(converted.contains(r#"revision="realtek/android-14/premp.google-refplus""#));
    }

    #[test]
    fn test_unknown_scenario_is_fatal() {
        let args = ConvertArgs {
            input: PathBuf::from("/nonexistent"),
            output: PathBuf::from("/nonexistent"),
            scenario: "sideways".to_string(),
            target: None,
            config: None,
        };
        assert!(run(&args).is_err());
    }
}
